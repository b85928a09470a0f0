//! Registry text classification.
//!
//! WHOIS output is unstructured and every registry formats it differently,
//! so classification is an ordered table of pattern rules rather than a
//! parser. The order is significant:
//!
//! 1. explicit "free" markers win over everything else, because some
//!    registries echo a `Domain Name:` line even for unregistered names;
//! 2. any registration evidence means the name is taken;
//! 3. anything else is treated as available.
//!
//! For taken names the first expiry-labelled line is scanned with a list of
//! date formats, first match wins.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::SweepError;
use crate::types::{NormalizedDate, Verdict};

/// What a matching rule concludes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Available,
    Taken,
}

/// One `(pattern, outcome)` entry of the rule table.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pattern: Regex,
    outcome: RuleOutcome,
}

impl ClassificationRule {
    /// Build a rule from a regex. Patterns are matched against the whole
    /// registry response; add `(?i)` for case-insensitive matching.
    pub fn new(pattern: &str, outcome: RuleOutcome) -> Result<Self, SweepError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            outcome,
        })
    }

    pub fn outcome(&self) -> RuleOutcome {
        self.outcome
    }

    fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Turns the captures of a date pattern into a normalized date.
pub type DateNormalizer = fn(&Captures<'_>) -> Option<NormalizedDate>;

/// One expiry date encoding.
#[derive(Debug, Clone)]
pub struct DateFormat {
    name: &'static str,
    pattern: Regex,
    normalize: DateNormalizer,
}

impl DateFormat {
    pub fn new(
        name: &'static str,
        pattern: &str,
        normalize: DateNormalizer,
    ) -> Result<Self, SweepError> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            normalize,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `None` when the pattern does not match the line; `Some(None)` when it
    /// matches but the captures do not form a date.
    fn extract(&self, line: &str) -> Option<Option<NormalizedDate>> {
        self.pattern
            .captures(line)
            .map(|caps| (self.normalize)(&caps))
    }
}

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn month_number(abbrev: &str) -> Option<usize> {
    let abbrev = abbrev.to_lowercase();
    MONTHS.iter().position(|m| *m == abbrev).map(|i| i + 1)
}

/// `2025-03-01` anywhere on the line (including `2025-03-01T00:00:00Z`).
fn normalize_iso(caps: &Captures<'_>) -> Option<NormalizedDate> {
    Some(NormalizedDate::from_parts(&caps[1], &caps[2], &caps[3]))
}

/// `01-Mar-2025`, as used by `.uk`-style registries.
fn normalize_day_month_year(caps: &Captures<'_>) -> Option<NormalizedDate> {
    let month = month_number(&caps[2])?;
    Some(NormalizedDate::from_parts(
        &caps[3],
        &format!("{:02}", month),
        &caps[1],
    ))
}

/// Bare `20250301`, as used by `.br`-style registries. Positional slicing only.
fn normalize_compact(caps: &Captures<'_>) -> Option<NormalizedDate> {
    Some(NormalizedDate::from_parts(&caps[1], &caps[2], &caps[3]))
}

lazy_static! {
    static ref BUILTIN_RULES: Vec<ClassificationRule> = {
        let table: [(&str, RuleOutcome); 6] = [
            (r"(?i)status:\s*free", RuleOutcome::Available),
            (r"(?i)is free", RuleOutcome::Available),
            (r"(?i)status:\s*available", RuleOutcome::Available),
            (r"(?i)domain name:", RuleOutcome::Taken),
            (r"(?i)name server", RuleOutcome::Taken),
            (r"(?i)registrar:", RuleOutcome::Taken),
        ];
        table
            .iter()
            .map(|(pattern, outcome)| {
                ClassificationRule::new(pattern, *outcome).expect("built-in rule pattern")
            })
            .collect()
    };

    static ref BUILTIN_EXPIRY_LABELS: Vec<Regex> = [
        r"(?i)expiry date",
        r"(?i)expiration date",
        r"(?i)registry expiry date",
        r"(?i)expiration time",
        r"(?i)paid-till",
        r"(?i)^expires:",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("built-in expiry label"))
    .collect();

    static ref BUILTIN_DATE_FORMATS: Vec<DateFormat> = vec![
        DateFormat::new("iso", r"(\d{4})-(\d{2})-(\d{2})", normalize_iso)
            .expect("built-in date format"),
        DateFormat::new(
            "dd-mon-yyyy",
            r"(\d{2})-([A-Za-z]{3})-(\d{4})",
            normalize_day_month_year,
        )
        .expect("built-in date format"),
        DateFormat::new(
            "yyyymmdd",
            r"(?:^|[^0-9])(\d{4})(\d{2})(\d{2})(?:[^0-9]|$)",
            normalize_compact,
        )
        .expect("built-in date format"),
    ];

    static ref DEFAULT_CLASSIFIER: RegistryClassifier = RegistryClassifier::default();
}

/// Rule-table classifier for raw WHOIS output.
///
/// The built-in table covers gTLD registries plus the common ccTLD
/// encodings. New registry formats can be handled by adding rules,
/// expiry labels or date formats without touching the built-ins.
#[derive(Debug, Clone)]
pub struct RegistryClassifier {
    rules: Vec<ClassificationRule>,
    expiry_labels: Vec<Regex>,
    date_formats: Vec<DateFormat>,
}

impl Default for RegistryClassifier {
    fn default() -> Self {
        Self {
            rules: BUILTIN_RULES.clone(),
            expiry_labels: BUILTIN_EXPIRY_LABELS.clone(),
            date_formats: BUILTIN_DATE_FORMATS.clone(),
        }
    }
}

impl RegistryClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule to the table.
    ///
    /// Availability markers go after the existing markers but ahead of all
    /// registration-evidence rules, so the marker priority is kept.
    pub fn add_rule(&mut self, rule: ClassificationRule) {
        match rule.outcome {
            RuleOutcome::Available => {
                let pos = self
                    .rules
                    .iter()
                    .position(|r| r.outcome == RuleOutcome::Taken)
                    .unwrap_or(self.rules.len());
                self.rules.insert(pos, rule);
            }
            RuleOutcome::Taken => self.rules.push(rule),
        }
    }

    /// Add a line pattern that marks the expiry line.
    pub fn add_expiry_label(&mut self, pattern: &str) -> Result<(), SweepError> {
        self.expiry_labels.push(Regex::new(pattern)?);
        Ok(())
    }

    /// Add a date format, tried after the existing ones.
    pub fn add_date_format(&mut self, format: DateFormat) {
        self.date_formats.push(format);
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classify a registry response.
    pub fn classify(&self, text: &str) -> Verdict {
        let outcome = self
            .rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.outcome)
            .unwrap_or(RuleOutcome::Available);

        match outcome {
            RuleOutcome::Available => Verdict::Available,
            RuleOutcome::Taken => Verdict::Taken {
                expiry: self.extract_expiry(text),
            },
        }
    }

    /// Expiry date from the first expiry-labelled line. Later labelled
    /// lines are never consulted.
    ///
    /// Formats are tried in order and the first one whose pattern matches
    /// decides; if its captures do not normalize, there is no date.
    pub fn extract_expiry(&self, text: &str) -> Option<NormalizedDate> {
        let line = text
            .lines()
            .find(|line| self.expiry_labels.iter().any(|label| label.is_match(line)))?;

        let (format, date) = self
            .date_formats
            .iter()
            .find_map(|format| format.extract(line).map(|date| (format, date)))?;

        tracing::trace!(
            format = format.name(),
            line,
            normalized = date.is_some(),
            "expiry date matched"
        );
        date
    }
}

/// Classify with the built-in rule table.
pub fn classify(text: &str) -> Verdict {
    DEFAULT_CLASSIFIER.classify(text)
}

/// Extract an expiry date with the built-in labels and formats.
pub fn extract_expiry(text: &str) -> Option<NormalizedDate> {
    DEFAULT_CLASSIFIER.extract_expiry(text)
}
