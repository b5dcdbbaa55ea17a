use crate::core::models::ids::AtomId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    IncompleteOctet,
    ExpandedOctet,
    Hypervalent,
    UnusualBond,
    ValencyExceeded,
    ChargeImbalance,
    DanglingBond,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IncompleteOctet => "incomplete-octet",
            Self::ExpandedOctet => "expanded-octet",
            Self::Hypervalent => "hypervalent",
            Self::UnusualBond => "unusual-bond",
            Self::ValencyExceeded => "valency-exceeded",
            Self::ChargeImbalance => "charge-imbalance",
            Self::DanglingBond => "dangling-bond",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// One diagnosed rule violation.
///
/// Graph-level warnings (charge imbalance, dangling bonds to unknown atoms) may name no atom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationWarning {
    pub kind: WarningKind,
    pub atom_id: Option<AtomId>,
    pub atom_symbol: Option<String>,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    AddHydrogen,
    AddLonePair,
    ChangeBondOrder,
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AddHydrogen => "add-hydrogen",
            Self::AddLonePair => "add-lone-pair",
            Self::ChangeBondOrder => "change-bond-order",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSuggestion {
    pub kind: SuggestionKind,
    pub atom_id: AtomId,
    pub atom_symbol: String,
    pub action: String,
    pub reason: String,
}

/// Warning and suggestion totals of a [`ValidationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ValidationSummary {
    pub total_warnings: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub suggestions: usize,
}

/// The structured diagnosis of one atom/bond graph.
///
/// Warnings and suggestions follow atom order, then bond order. Only `valency-exceeded`,
/// `expanded-octet` and `dangling-bond` warnings clear `is_valid`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub warnings: Vec<ValidationWarning>,
    pub suggestions: Vec<ValidationSuggestion>,
    /// Nominal valence electrons per atom.
    pub electron_counts: BTreeMap<AtomId, u32>,
    /// Capped bond-order sum per atom.
    pub bond_counts: BTreeMap<AtomId, u32>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            warnings: Vec::new(),
            suggestions: Vec::new(),
            electron_counts: BTreeMap::new(),
            bond_counts: BTreeMap::new(),
        }
    }
}

impl ValidationResult {
    pub fn summary(&self) -> ValidationSummary {
        let count = |severity| self.warnings.iter().filter(|w| w.severity == severity).count();
        ValidationSummary {
            total_warnings: self.warnings.len(),
            high: count(Severity::High),
            medium: count(Severity::Medium),
            low: count(Severity::Low),
            suggestions: self.suggestions.len(),
        }
    }

    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &ValidationWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    pub fn warnings_for<'a>(
        &'a self,
        atom_id: &'a AtomId,
    ) -> impl Iterator<Item = &'a ValidationWarning> + 'a {
        self.warnings
            .iter()
            .filter(move |w| w.atom_id.as_ref() == Some(atom_id))
    }

    pub(crate) fn push_warning(&mut self, warning: ValidationWarning) {
        if matches!(
            warning.kind,
            WarningKind::ValencyExceeded | WarningKind::ExpandedOctet | WarningKind::DanglingBond
        ) {
            self.is_valid = false;
        }
        self.warnings.push(warning);
    }
}
