use anyhow::{Result, bail, ensure};
use serde::{Deserialize, Serialize};

/// A per-district sum of a numeric precinct column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub name: String,
    pub column: String,
}

/// A per-district value computed from other updaters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Derived {
    /// `minuend - subtrahend`
    Difference { name: String, minuend: String, subtrahend: String },
    /// `numerator / denominator`, or 0 where the denominator is 0.
    Ratio { name: String, numerator: String, denominator: String },
}

impl Derived {
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Derived::Difference { name, .. } | Derived::Ratio { name, .. } => name,
        }
    }

    /// Names of the updaters this value is computed from.
    #[inline]
    pub fn operands(&self) -> [&str; 2] {
        match self {
            Derived::Difference { minuend, subtrahend, .. } => [minuend.as_str(), subtrahend.as_str()],
            Derived::Ratio { numerator, denominator, .. } => [numerator.as_str(), denominator.as_str()],
        }
    }

    /// Combine operand values for a single district.
    #[inline]
    pub(crate) fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Derived::Difference { .. } => lhs - rhs,
            Derived::Ratio { .. } => if rhs == 0.0 { 0.0 } else { lhs / rhs },
        }
    }
}

/// The set of per-district statistics a plan keeps up to date.
/// Cut edges are always tracked and need no entry here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Updaters {
    tallies: Vec<Tally>,
    derived: Vec<Derived>,
}

impl Updaters {
    /// Name of the tally holding district populations.
    pub const POPULATION: &'static str = "population";

    pub fn new() -> Self { Self::default() }

    /// Standard Gingles updaters: population, VAP, BVAP, HVAP, WVAP, and nWVAP = VAP - WVAP.
    pub fn gingles(pop_col: &str) -> Self {
        Self::new()
            .with_tally(Self::POPULATION, pop_col)
            .with_tally("VAP", "VAP")
            .with_tally("BVAP", "BVAP")
            .with_tally("HVAP", "HVAP")
            .with_tally("WVAP", "WVAP")
            .with_derived(Derived::Difference {
                name: "nWVAP".into(),
                minuend: "VAP".into(),
                subtrahend: "WVAP".into(),
            })
    }

    /// Add a tally of `column` under `name`, replacing any updater with the same name.
    pub fn with_tally(mut self, name: &str, column: &str) -> Self {
        self.remove(name);
        self.tallies.push(Tally { name: name.into(), column: column.into() });
        self
    }

    /// Add a derived value, replacing any updater with the same name.
    pub fn with_derived(mut self, derived: Derived) -> Self {
        self.remove(derived.name());
        self.derived.push(derived);
        self
    }

    #[inline] pub fn tallies(&self) -> &[Tally] { &self.tallies }

    #[inline] pub fn derived(&self) -> &[Derived] { &self.derived }

    /// Check if any updater has the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.tally(name).is_some() || self.derived_value(name).is_some()
    }

    #[inline]
    pub(crate) fn tally(&self, name: &str) -> Option<&Tally> {
        self.tallies.iter().find(|t| t.name == name)
    }

    #[inline]
    pub(crate) fn derived_value(&self, name: &str) -> Option<&Derived> {
        self.derived.iter().find(|d| d.name() == name)
    }

    /// Distinct precinct columns the tallies read, in declaration order.
    pub(crate) fn columns(&self) -> Vec<&str> {
        let mut columns = Vec::with_capacity(self.tallies.len());
        for tally in &self.tallies {
            if !columns.contains(&tally.column.as_str()) { columns.push(tally.column.as_str()) }
        }
        columns
    }

    /// Attach a derived value after construction; its operands must already exist.
    pub(crate) fn push_derived(&mut self, derived: Derived) -> Result<()> {
        ensure!(!self.contains(derived.name()), "updater '{}' already exists", derived.name());
        for operand in derived.operands() {
            ensure!(self.contains(operand), "derived value '{}' refers to unknown updater '{operand}'", derived.name());
        }
        self.derived.push(derived);
        Ok(())
    }

    /// Check that every derived value refers to known updaters without cycles.
    pub(crate) fn validate(&self) -> Result<()> {
        for derived in &self.derived {
            let mut stack = vec![(derived.name(), 0usize)];
            while let Some((name, depth)) = stack.pop() {
                if depth > self.derived.len() {
                    bail!("derived value '{}' depends on itself", derived.name());
                }
                if self.tally(name).is_some() { continue }
                let Some(next) = self.derived_value(name) else {
                    bail!("derived value '{}' refers to unknown updater '{name}'", derived.name());
                };
                stack.extend(next.operands().map(|operand| (operand, depth + 1)));
            }
        }
        Ok(())
    }

    fn remove(&mut self, name: &str) {
        self.tallies.retain(|t| t.name != name);
        self.derived.retain(|d| d.name() != name);
    }
}
