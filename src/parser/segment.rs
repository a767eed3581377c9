use std::ops::Range;
use std::sync::LazyLock;

use regex::{Match, Regex};
use tracing::debug;

use super::classify::Classifier;
use super::normalize::normalize;
use crate::record::Publication;

static CNJ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{7}-[0-9]{2}\.[0-9]{4}\.[0-9]{1,2}\.[0-9]{2}\.[0-9]{4}").unwrap());
static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Publicação\s+[0-9]+\s+de\s+[0-9]+").unwrap());
static PROCESS_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)publica[cç][aã]o processo:\s*([0-9]{7}-[0-9]{2}\.[0-9]{4}\.[0-9]{1,2}\.[0-9]{2}\.[0-9]{4})").unwrap()
});
static AVAILABILITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)data de disponibiliza[cç][aã]o:\s*([0-9]{2}/[0-9]{2}/[0-9]{4})").unwrap()
});
static PLAIN_NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)publica[cç][aã]o:\s*[0-9]+\s+de\s+[0-9]+").unwrap());

/// Header layouts seen across gazettes, in detection priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `Publicação N de M`
    NumberedPublication,
    /// `Publicacao Processo: <cnj>`
    ProcessKeyed,
    /// `PUBLICAÇÃO: N de M`
    PlainNumbered,
}

/// A header plus the body that follows it, before process-number filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub header: String,
    pub text: String,
}

pub fn detect_layout(text: &str) -> Option<Layout> {
    if NUMBERED_RE.is_match(text) {
        Some(Layout::NumberedPublication)
    } else if PROCESS_HEADER_RE.is_match(text) {
        Some(Layout::ProcessKeyed)
    } else if PLAIN_NUMBERED_RE.is_match(text) {
        Some(Layout::PlainNumbered)
    } else {
        None
    }
}

/// Split one gazette into classified publications. Blocks without a CNJ
/// number are dropped; an unknown layout yields nothing.
pub fn segment(raw: &str, origin: &str, classifier: &Classifier) -> Vec<Publication> {
    let text = preprocess(raw);
    let candidates = split_candidates(&text);
    let total = candidates.len();

    let publications: Vec<Publication> = candidates
        .into_iter()
        .filter_map(|c| build_publication(c, origin, classifier))
        .collect();

    debug!(
        origin,
        layout = ?detect_layout(&text),
        candidates = total,
        kept = publications.len(),
        "segmented source"
    );
    publications
}

pub fn preprocess(raw: &str) -> String {
    raw.replace('\u{a0}', " ").replace('\r', "").trim().to_string()
}

pub fn split_candidates(text: &str) -> Vec<Candidate> {
    let numbered = split_on(&NUMBERED_RE, text);
    if !numbered.is_empty() {
        return numbered
            .into_iter()
            .map(|(header, body)| {
                let header = header.as_str().trim().to_string();
                let block = format!("{}\n{}", header, text[body].trim());
                Candidate { header, text: block }
            })
            .collect();
    }

    let mut candidates = Vec::new();
    let mut consumed: Vec<Range<usize>> = Vec::new();

    for (header, body) in split_on(&PROCESS_HEADER_RE, text) {
        let Some(caps) = PROCESS_HEADER_RE.captures(header.as_str()) else {
            continue;
        };
        let body_text = text[body.clone()].trim();
        let mut label = format!("Publicação {}", &caps[1]);
        if let Some(date) = AVAILABILITY_RE.captures(body_text) {
            label.push_str(&format!(" ({})", &date[1]));
        }
        candidates.push(Candidate {
            header: label,
            text: format!("{}\n{}", header.as_str().trim(), body_text),
        });
        consumed.push(header.start()..body.end);
    }

    for (header, body) in split_on(&PLAIN_NUMBERED_RE, text) {
        if consumed.iter().any(|span| span.contains(&header.start())) {
            continue;
        }
        let end = consumed
            .iter()
            .map(|span| span.start)
            .filter(|&start| start >= body.start)
            .fold(body.end, usize::min);
        let header = header.as_str().trim().to_string();
        let block = format!("{}\n{}", header, text[body.start..end].trim());
        candidates.push(Candidate { header, text: block });
    }

    candidates
}

/// Every header match with the byte range of the body that follows it.
fn split_on<'t>(re: &Regex, text: &'t str) -> Vec<(Match<'t>, Range<usize>)> {
    let headers: Vec<Match<'t>> = re.find_iter(text).collect();
    headers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = headers.get(i + 1).map_or(text.len(), |next| next.start());
            (*m, m.end()..end)
        })
        .collect()
}

fn build_publication(candidate: Candidate, origin: &str, classifier: &Classifier) -> Option<Publication> {
    let process_number = CNJ_RE.find(&candidate.text)?.as_str().to_string();
    Some(Publication {
        process_number,
        movement_type: classifier.classify(&candidate.text),
        normalized_text: normalize(&candidate.text),
        raw_text: candidate.text,
        position: candidate.header.clone(),
        header: candidate.header,
        origin: origin.to_string(),
        duplicate_of: Vec::new(),
    })
}

/// Whether `s` is exactly one CNJ process number.
pub fn is_process_number(s: &str) -> bool {
    CNJ_RE.find(s).is_some_and(|m| m.start() == 0 && m.end() == s.len())
}
