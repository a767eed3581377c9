use std::fmt;
use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters of each block inspected by the tiered rules. Going much lower
/// than ~1000 starts missing types announced after long party listings.
pub const DEFAULT_WINDOW_CHARS: usize = 1500;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)t[ií]tulo:\s*(.+)").unwrap());

static BUILTIN: LazyLock<RuleTable> = LazyLock::new(|| RuleTable {
    rules: vec![
        rule(MovementType::Sentenca, Tier::Conclusive, r"\bsenten[cç]a\b").unless_preceded_by("cumprimento de "),
        rule(MovementType::Acordao, Tier::Conclusive, r"(?:\bintima[cç][aã]o de )?\bac[oó]rd[aã]o\b"),
        rule(MovementType::Decisao, Tier::Conclusive, r"\bdecis[aã]o\b"),
        rule(MovementType::Despacho, Tier::Conclusive, r"\bdespacho\b"),
        rule(MovementType::AtoOrdinatorio, Tier::Administrative, r"\bato ordinat[oó]rio\b"),
        rule(MovementType::EditalDeIntimacao, Tier::Administrative, r"\bedital de intima[cç][aã]o\b"),
        rule(MovementType::InclusaoEmPauta, Tier::Administrative, r"\binclus[aã]o em pauta\b|\bpauta de julgamento\b"),
        rule(MovementType::CumprimentoDeSentenca, Tier::Administrative, r"\bcumprimento de senten[cç]a\b"),
        rule(
            MovementType::Intimacao,
            Tier::TargetedIntimation,
            r"\bintima[cç][aã]o para\b|\bintimem-se as partes para\b|\bintime-se a parte\b|\bconte[uú]do:\s*intima[cç][aã]o\b",
        ),
        rule(MovementType::Intimacao, Tier::CommunicationField, r"\btipo de comunica[cç][aã]o:\s*intima[cç][aã]o\b"),
        rule(MovementType::Intimacao, Tier::GenericIntimation, r"\bintima[cç][aã]o\b").unless_preceded_by("edital de "),
    ],
    title_rules: vec![
        rule(MovementType::Despacho, Tier::Conclusive, r"\bdespacho\b"),
        rule(MovementType::Decisao, Tier::Conclusive, r"\bdecis[aã]o\b"),
        rule(MovementType::Sentenca, Tier::Conclusive, r"\bsenten[cç]a\b"),
        rule(MovementType::Intimacao, Tier::GenericIntimation, r"\bintima[cç][aã]o\b"),
    ],
});

fn rule(label: MovementType, tier: Tier, pattern: &str) -> Rule {
    Rule::new(label, tier, pattern).unwrap()
}

/// Kind of judicial act a notice announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    #[serde(rename = "SENTENCA")]
    Sentenca,
    #[serde(rename = "ACORDAO")]
    Acordao,
    #[serde(rename = "DECISAO")]
    Decisao,
    #[serde(rename = "DESPACHO")]
    Despacho,
    #[serde(rename = "ATO ORDINATORIO")]
    AtoOrdinatorio,
    #[serde(rename = "EDITAL DE INTIMACAO")]
    EditalDeIntimacao,
    #[serde(rename = "INCLUSAO EM PAUTA")]
    InclusaoEmPauta,
    #[serde(rename = "CUMPRIMENTO DE SENTENCA")]
    CumprimentoDeSentenca,
    #[serde(rename = "INTIMACAO")]
    Intimacao,
    #[serde(rename = "Tipo Não Identificado")]
    Unidentified,
}

impl MovementType {
    pub fn label(self) -> &'static str {
        match self {
            MovementType::Sentenca => "SENTENCA",
            MovementType::Acordao => "ACORDAO",
            MovementType::Decisao => "DECISAO",
            MovementType::Despacho => "DESPACHO",
            MovementType::AtoOrdinatorio => "ATO ORDINATORIO",
            MovementType::EditalDeIntimacao => "EDITAL DE INTIMACAO",
            MovementType::InclusaoEmPauta => "INCLUSAO EM PAUTA",
            MovementType::CumprimentoDeSentenca => "CUMPRIMENTO DE SENTENCA",
            MovementType::Intimacao => "INTIMACAO",
            MovementType::Unidentified => "Tipo Não Identificado",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Priority tiers, highest first. Derived `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Conclusive,
    Administrative,
    TargetedIntimation,
    CommunicationField,
    GenericIntimation,
}

impl Tier {
    /// Tiers whose hits all surface as plain `INTIMACAO`.
    pub fn is_intimation(self) -> bool {
        self >= Tier::TargetedIntimation
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    label: MovementType,
    tier: Tier,
    pattern: Regex,
    unless_preceded_by: Option<String>,
}

impl Rule {
    /// Patterns are matched against lower-cased text.
    pub fn new(label: MovementType, tier: Tier, pattern: &str) -> Result<Self, regex::Error> {
        let label = if tier.is_intimation() { MovementType::Intimacao } else { label };
        Ok(Rule {
            label,
            tier,
            pattern: Regex::new(pattern)?,
            unless_preceded_by: None,
        })
    }

    /// Reject hits whose preceding text ends with `prefix`.
    pub fn unless_preceded_by(mut self, prefix: &str) -> Self {
        self.unless_preceded_by = Some(prefix.to_lowercase());
        self
    }

    pub fn label(&self) -> MovementType {
        self.label
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn guard(&self) -> Option<&str> {
        self.unless_preceded_by.as_deref()
    }

    /// First hit in `text` (already lower-cased) that passes the guard.
    fn find_in(&self, text: &str) -> Option<usize> {
        self.pattern
            .find_iter(text)
            .map(|m| m.start())
            .find(|&start| match &self.unless_preceded_by {
                Some(prefix) => !text[..start].ends_with(prefix.as_str()),
                None => true,
            })
    }
}

/// Rule as written in configuration. Intimation tiers may omit `label`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleSpec {
    pub label: Option<MovementType>,
    pub tier: Tier,
    pub pattern: String,
    pub unless_preceded_by: Option<String>,
}

/// Ordered rule list. Position in `rules` breaks ties inside a tier.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
    title_rules: Vec<Rule>,
}

impl RuleTable {
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Replace the tiered rules; the `Título:` fallback subset stays built in.
    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self> {
        let mut rules = Vec::with_capacity(specs.len());
        for spec in specs {
            let label = match spec.label {
                Some(label) => label,
                None if spec.tier.is_intimation() => MovementType::Intimacao,
                None => return Err(anyhow!("rule `{}` in tier {:?} needs a label", spec.pattern, spec.tier)),
            };
            if label == MovementType::Unidentified {
                return Err(anyhow!("rule `{}` cannot map to the unidentified sentinel", spec.pattern));
            }
            let mut r = Rule::new(label, spec.tier, &spec.pattern)
                .with_context(|| format!("invalid rule pattern `{}`", spec.pattern))?;
            if let Some(prefix) = &spec.unless_preceded_by {
                r = r.unless_preceded_by(prefix);
            }
            rules.push(r);
        }
        Ok(RuleTable {
            rules,
            title_rules: BUILTIN.title_rules.clone(),
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        RuleTable::builtin()
    }
}

/// One rule hit inside the classification window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub label: MovementType,
    pub tier: Tier,
    /// Byte offset in the lower-cased window.
    pub start: usize,
    /// Hit sits right after a `Conteudo:` marker.
    pub anchored: bool,
    pub rule_index: usize,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    table: RuleTable,
    window_chars: usize,
}

impl Classifier {
    pub fn new(table: RuleTable, window_chars: usize) -> Self {
        Classifier { table, window_chars }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn window_chars(&self) -> usize {
        self.window_chars
    }

    /// Every rule that hits inside the window, in table order.
    pub fn matches(&self, text: &str) -> Vec<RuleMatch> {
        let window = prefix_chars(text, self.window_chars).to_lowercase();
        self.table
            .rules
            .iter()
            .enumerate()
            .filter_map(|(rule_index, r)| {
                let start = r.find_in(&window)?;
                Some(RuleMatch {
                    label: r.label,
                    tier: r.tier,
                    start,
                    anchored: is_content_anchored(&window[..start]),
                    rule_index,
                })
            })
            .collect()
    }

    /// Total: falls back to the `Título:` field, then to `Unidentified`.
    pub fn classify(&self, text: &str) -> MovementType {
        let best = self
            .matches(text)
            .into_iter()
            .min_by_key(|m| (m.tier, !m.anchored, m.start, m.rule_index));
        if let Some(m) = best {
            return m.label;
        }
        self.classify_title(text).unwrap_or(MovementType::Unidentified)
    }

    fn classify_title(&self, text: &str) -> Option<MovementType> {
        let caps = TITLE_RE.captures(text)?;
        let title = caps[1].trim().to_lowercase();
        self.table
            .title_rules
            .iter()
            .find(|r| r.find_in(&title).is_some())
            .map(|r| r.label)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(RuleTable::builtin(), DEFAULT_WINDOW_CHARS)
    }
}

fn prefix_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn is_content_anchored(before: &str) -> bool {
    let before = before.trim_end();
    before.ends_with("conteudo:") || before.ends_with("conteúdo:")
}
