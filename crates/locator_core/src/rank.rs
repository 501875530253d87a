use locator_logging::locator_debug;

use crate::KeywordLexicon;

/// Snapshot of one anchor element taken from a loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub text: String,
    pub href: String,
    pub visible: bool,
    pub enabled: bool,
}

impl LinkCandidate {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
            visible: true,
            enabled: true,
        }
    }

    fn is_interactive(&self) -> bool {
        !self.text.is_empty() && self.visible && self.enabled
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedLink {
    pub href: String,
    pub rank: u32,
}

/// Best store-locator links among `candidates`, in first-seen order.
///
/// Only interactive candidates whose text matches the lexicon are scored. The
/// candidates sharing the best rank are kept, and each one's href must itself
/// match the lexicon before it is accepted. An empty result means no candidate
/// qualified.
pub fn rank_candidates(candidates: &[LinkCandidate], lexicon: &KeywordLexicon) -> Vec<RankedLink> {
    let scored: Vec<(&LinkCandidate, u32)> = candidates
        .iter()
        .filter(|c| c.is_interactive())
        .filter_map(|c| lexicon.match_text(&c.text).map(|rank| (c, rank)))
        .collect();

    let Some(best) = scored.iter().map(|(_, rank)| *rank).min() else {
        locator_debug!("no anchor text matched among {} candidates", candidates.len());
        return Vec::new();
    };

    // NOTE: hrefs that carry no keyword (opaque ids) are dropped here even when
    // their text matched at the best rank.
    let mut ranked: Vec<RankedLink> = Vec::new();
    for (candidate, _) in scored.into_iter().filter(|(_, rank)| *rank == best) {
        if lexicon.match_text(&candidate.href).is_none() {
            locator_debug!("href {} rejected: no keyword in url", candidate.href);
            continue;
        }
        if ranked.iter().any(|r| r.href == candidate.href) {
            continue;
        }
        ranked.push(RankedLink {
            href: candidate.href.clone(),
            rank: best,
        });
    }

    locator_debug!("best rank {} kept {} link(s)", best, ranked.len());
    ranked
}

/// Hrefs of [`rank_candidates`].
pub fn rank_links(candidates: &[LinkCandidate], lexicon: &KeywordLexicon) -> Vec<String> {
    rank_candidates(candidates, lexicon)
        .into_iter()
        .map(|link| link.href)
        .collect()
}
