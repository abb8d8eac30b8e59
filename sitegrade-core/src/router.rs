//! Auto-selection router: decides which pages feed which category.

use crate::model::{AuditMapping, Category, PageClassification, PageType};
use rand::Rng;
use rand::seq::index::sample;
use std::collections::{HashMap, HashSet};
use tracing::debug;

const PERFORMANCE_CAP: usize = 6;
const SEO_CAP: usize = 5;
const SEO_MIN: usize = 3;
const CONTENT_CAP: usize = 3;
const EEAT_CAP: usize = 3;
const LINKS_CAP: usize = 5;
const TECHNICAL_CAP: usize = 5;
const RANDOM_SAMPLES: usize = 2;

/// Analyzer categories that run on a page of the given type.
pub fn sections_for(page_type: PageType) -> &'static [Category] {
    use Category::*;
    match page_type {
        PageType::Home => &[
            Performance,
            Technology,
            TechnicalSeo,
            Social,
            LocalSeo,
            Usability,
            Links,
            Seo,
            Content,
        ],
        PageType::Contact => &[LocalSeo, Usability, Technology, Seo, TechnicalSeo],
        PageType::About => &[Eeat, Content, Social, Seo, TechnicalSeo],
        PageType::Blog => &[Content, Eeat, Social, Seo, TechnicalSeo],
        PageType::Product => &[Seo, Performance, Usability, Links, Content, TechnicalSeo],
        PageType::Service => &[Seo, Content, Eeat, Performance, TechnicalSeo],
        PageType::Category | PageType::Tag | PageType::Archive => {
            &[Seo, Links, Usability, TechnicalSeo]
        }
        PageType::Legal => &[Usability, Technology, TechnicalSeo],
        PageType::Other => &[Seo, Links, Usability, Content, TechnicalSeo],
    }
}

/// Page buckets used by the selection rules.
struct SitePages<'a> {
    all: &'a [PageClassification],
    home: Option<&'a str>,
    contact: Option<&'a str>,
    about: Option<&'a str>,
    blogs: Vec<&'a str>,
    products: Vec<&'a str>,
    services: Vec<&'a str>,
}

impl<'a> SitePages<'a> {
    fn new(all: &'a [PageClassification]) -> Self {
        let first = |t: PageType| {
            all.iter()
                .find(|p| p.page_type == t)
                .map(|p| p.url.as_str())
        };
        let every = |t: PageType| {
            all.iter()
                .filter(|p| p.page_type == t)
                .map(|p| p.url.as_str())
                .collect::<Vec<_>>()
        };
        Self {
            all,
            home: first(PageType::Home),
            contact: first(PageType::Contact),
            about: first(PageType::About),
            blogs: every(PageType::Blog),
            products: every(PageType::Product),
            services: every(PageType::Service),
        }
    }

    /// Homepage, else the first classified page.
    fn fallback(&self) -> Option<&'a str> {
        self.home
            .or_else(|| self.all.first().map(|p| p.url.as_str()))
    }
}

/// Ordered, duplicate-free page list with a cap.
struct Selection {
    urls: Vec<String>,
    cap: usize,
}

impl Selection {
    fn new(cap: usize) -> Self {
        Self {
            urls: Vec::new(),
            cap,
        }
    }

    fn push(&mut self, url: Option<&str>) {
        if let Some(url) = url
            && self.urls.len() < self.cap
            && !self.urls.iter().any(|u| u == url)
        {
            self.urls.push(url.to_string());
        }
    }

    fn extend<'a>(&mut self, urls: impl IntoIterator<Item = &'a str>) {
        for url in urls {
            self.push(Some(url));
        }
    }

    fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    fn len(&self) -> usize {
        self.urls.len()
    }

    /// Adds up to `count` pages drawn at random from those not yet selected.
    fn sample<R: Rng + ?Sized>(&mut self, pool: &[PageClassification], count: usize, rng: &mut R) {
        let remaining: Vec<&str> = pool
            .iter()
            .map(|p| p.url.as_str())
            .filter(|u| !self.contains(u))
            .collect();
        let amount = count.min(remaining.len());
        if amount == 0 {
            return;
        }
        let mut picked = sample(rng, remaining.len(), amount).into_vec();
        picked.sort_unstable();
        for index in picked {
            self.push(Some(remaining[index]));
        }
    }
}

fn select<R: Rng + ?Sized>(category: Category, site: &SitePages<'_>, rng: &mut R) -> Vec<String> {
    let selection = match category {
        Category::Performance => {
            let mut s = Selection::new(PERFORMANCE_CAP);
            s.push(site.home);
            s.extend(site.services.iter().copied());
            s.extend(site.products.iter().copied());
            s.push(site.about);
            s
        }
        Category::LocalSeo => {
            let mut s = Selection::new(2);
            s.push(site.home);
            s.push(site.contact);
            s
        }
        Category::Seo => {
            let mut s = Selection::new(SEO_CAP);
            s.extend(site.services.iter().copied());
            s.extend(site.products.iter().copied());
            s.extend(site.blogs.iter().copied());
            if s.urls.is_empty() {
                s.push(site.home);
            }
            if s.len() < SEO_MIN {
                let backfill: Vec<&str> = site
                    .all
                    .iter()
                    .filter(|p| {
                        !p.page_type.is_listing()
                            && !matches!(p.page_type, PageType::Contact | PageType::Legal)
                            && !s.contains(&p.url)
                    })
                    .take(SEO_MIN - s.len())
                    .map(|p| p.url.as_str())
                    .collect();
                s.extend(backfill);
            }
            s
        }
        Category::Content => {
            let mut s = Selection::new(CONTENT_CAP);
            s.extend(site.blogs.iter().copied());
            if s.len() < CONTENT_CAP {
                s.extend(site.services.iter().copied());
            }
            if s.urls.is_empty() {
                s.push(site.home);
            }
            s
        }
        Category::Eeat => {
            let mut s = Selection::new(EEAT_CAP);
            s.push(site.about);
            s.extend(site.blogs.iter().copied());
            s
        }
        Category::Technology | Category::Usability => {
            let mut s = Selection::new(usize::MAX);
            s.push(site.home);
            s.push(site.contact);
            if s.len() < 2 {
                let filler = site
                    .all
                    .iter()
                    .map(|p| p.url.as_str())
                    .find(|u| Some(*u) != site.home && Some(*u) != site.contact);
                s.push(filler);
            }
            s
        }
        Category::Social => {
            let mut s = Selection::new(usize::MAX);
            s.push(site.home);
            s.extend(site.blogs.iter().take(2).copied());
            s
        }
        Category::Links => {
            let mut s = Selection::new(LINKS_CAP);
            s.push(site.home);
            s.extend(site.products.iter().take(2).copied());
            s.sample(site.all, RANDOM_SAMPLES, rng);
            s
        }
        Category::TechnicalSeo => {
            let mut s = Selection::new(TECHNICAL_CAP);
            s.push(site.home);
            s.push(site.products.first().copied());
            s.push(site.blogs.first().copied());
            s.sample(site.all, RANDOM_SAMPLES, rng);
            s
        }
    };

    let mut urls = selection.urls;
    if urls.is_empty()
        && let Some(fallback) = site.fallback()
    {
        urls.push(fallback.to_string());
    }
    urls
}

/// Builds the category → pages mapping.
///
/// `overrides` replace the heuristic for a category, restricted to URLs that
/// are part of `pages`. An override with no surviving URL is ignored.
pub fn route<R: Rng + ?Sized>(
    pages: &[PageClassification],
    overrides: &HashMap<Category, Vec<String>>,
    rng: &mut R,
) -> AuditMapping {
    let site = SitePages::new(pages);
    let known: HashSet<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    let mut mapping = AuditMapping::new();

    for category in Category::ALL {
        let heuristic = select(category, &site, rng);

        let chosen = match overrides.get(&category) {
            Some(requested) => {
                let mut valid: Vec<String> = Vec::new();
                for url in requested {
                    if known.contains(url.as_str()) && !valid.contains(url) {
                        valid.push(url.clone());
                    }
                }
                if valid.is_empty() {
                    debug!("Override for {} has no known pages, using heuristic", category);
                    heuristic
                } else {
                    valid
                }
            }
            None => heuristic,
        };

        debug!("Routing {} -> {:?}", category, chosen);
        mapping.insert(category, chosen);
    }

    mapping
}
