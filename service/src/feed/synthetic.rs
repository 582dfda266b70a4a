//! Seeded post generator used when no upstream credential is configured.
//!
//! Output is drawn from fixed sample pools with a generator seeded at
//! construction, so the first call on a fresh instance is reproducible from
//! run to run. Later calls continue the same stream.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local};
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::datefmt::display_date;
use super::model::{extract_hashtags, Account, Post};
use super::{ensure_limit, normalize_handle, normalize_tag, FeedError, PostSource};

/// Seed used by [`SyntheticSource::new`].
pub const DEFAULT_SEED: u64 = 42;

const HOURS_BETWEEN_POSTS: i64 = 12;
const MAX_REPLIES: u64 = 500;
const MAX_REPOSTS: u64 = 1000;
const MAX_LIKES: u64 = 5000;
const SYNTHETIC_ID_RANGE: std::ops::RangeInclusive<u64> = 1_000_000..=99_999_999;

/// (fullname, profile path, id)
const SAMPLE_ACCOUNTS: &[(&str, &str, u64)] = &[
    ("Raymond Hettinger", "/raymondh", 14_159_138),
    ("Guido van Rossum", "/gvanrossum", 10_945_672),
    ("Python Software", "/ThePSF", 63_873_759),
    ("Real Python", "/realpython", 752_486_881),
    ("Python Weekly", "/PythonWeekly", 315_766_685),
    ("Twitter", "/Twitter", 783_214),
    ("Tech News", "/technews", 123_456_789),
    ("Code Academy", "/codeacademy", 987_654_321),
];

const SAMPLE_TEXTS: &[&str] = &[
    "Just released a new #Python library for data processing! Check it out: github.com/example",
    "Historically, bash filename pattern matching was known as \"globbing\". Hence, the #python module called \"glob\".",
    "Excited to announce our new feature! #technology #innovation",
    "Working on some amazing #Python projects today. The productivity is real!",
    "Powerful voices. Inspiring women. #InternationalWomensDay",
    "New blog post about #programming best practices. Link in bio!",
    "Just deployed our latest microservice using #Python 3.12. Performance improvements are incredible!",
    "Anyone else loving the new features in Python 3.13? #python #coding",
    "Great conference talk today about #softwaredevelopment and #agile methodologies",
    "Remember: premature optimization is the root of all evil. #programming #python",
];

/// Backend that fabricates posts from sample data.
pub struct SyntheticSource {
    rng: Mutex<StdRng>,
}

impl SyntheticSource {
    /// Create a generator seeded with [`DEFAULT_SEED`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create a generator with an explicit seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn generate_for_tag(&self, tag: &str, limit: u32) -> Result<Vec<Post>, FeedError> {
        let tag = normalize_tag(tag)?.to_lowercase();
        let limit = ensure_limit(limit)?;
        let now = Local::now();

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let posts = (0..limit)
            .map(|index| {
                let (fullname, href, id) = SAMPLE_ACCOUNTS[rng.gen_range(0..SAMPLE_ACCOUNTS.len())];
                let mut text = SAMPLE_TEXTS[rng.gen_range(0..SAMPLE_TEXTS.len())].to_string();

                let mut tags: Vec<String> = extract_hashtags(&text)
                    .iter()
                    .map(|word| word[1..].to_lowercase())
                    .collect();
                if !tags.contains(&tag) {
                    tags.insert(0, tag.clone());
                    text = format!("{text}\n#{tag}");
                }

                Post {
                    account: Account::new(fullname, href, id),
                    display_date: posted_at(now, index),
                    text,
                    reply_count: rng.gen_range(0..=MAX_REPLIES),
                    repost_count: rng.gen_range(0..=MAX_REPOSTS),
                    like_count: rng.gen_range(0..=MAX_LIKES),
                    hashtags: tags.into_iter().map(|t| format!("#{t}")).collect(),
                }
            })
            .collect();

        Ok(posts)
    }

    fn generate_for_author(&self, handle: &str, limit: u32) -> Result<Vec<Post>, FeedError> {
        let handle = normalize_handle(handle)?;
        let limit = ensure_limit(limit)?;
        let now = Local::now();

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let account = find_sample_account(handle).unwrap_or_else(|| {
            Account::new(
                title_case(handle),
                format!("/{handle}"),
                rng.gen_range(SYNTHETIC_ID_RANGE),
            )
        });

        let posts = (0..limit)
            .map(|index| {
                let text = SAMPLE_TEXTS[rng.gen_range(0..SAMPLE_TEXTS.len())];
                Post {
                    account: account.clone(),
                    display_date: posted_at(now, index),
                    text: text.to_string(),
                    reply_count: rng.gen_range(0..=MAX_REPLIES),
                    repost_count: rng.gen_range(0..=MAX_REPOSTS),
                    like_count: rng.gen_range(0..=MAX_LIKES),
                    hashtags: extract_hashtags(text),
                }
            })
            .collect();

        Ok(posts)
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn posts_by_tag(&self, tag: &str, limit: u32) -> Result<Vec<Post>, FeedError> {
        self.generate_for_tag(tag, limit)
    }

    async fn posts_by_author(&self, handle: &str, limit: u32) -> Result<Vec<Post>, FeedError> {
        self.generate_for_author(handle, limit)
    }
}

/// Post `index` is `index * 12h` older than `now`.
fn posted_at(now: DateTime<Local>, index: u32) -> String {
    display_date(&(now - Duration::hours(i64::from(index) * HOURS_BETWEEN_POSTS)))
}

fn find_sample_account(handle: &str) -> Option<Account> {
    let wanted = handle.to_lowercase();
    SAMPLE_ACCOUNTS
        .iter()
        .find(|(_, href, _)| href.trim_start_matches('/').to_lowercase() == wanted)
        .map(|&(fullname, href, id)| Account::new(fullname, href, id))
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
