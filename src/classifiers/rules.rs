/// One `(predicate, label)` row of a [`RuleTable`].
#[derive(Debug, Clone, Copy)]
pub struct ThresholdRule<S, L> {
    pub predicate: fn(&S) -> bool,
    pub label: L,
}

/// An ordered threshold chain. Rows are tried top to bottom and the first
/// matching predicate wins; if none matches, the fallback label is returned.
#[derive(Debug, Clone)]
pub struct RuleTable<S, L> {
    rules: Vec<ThresholdRule<S, L>>,
    fallback: L,
}

impl<S, L: Copy> RuleTable<S, L> {
    pub fn new(fallback: L) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Appends a row below the existing ones.
    pub fn rule(mut self, predicate: fn(&S) -> bool, label: L) -> Self {
        self.rules.push(ThresholdRule { predicate, label });
        self
    }

    pub fn evaluate(&self, statistic: &S) -> L {
        self.rules
            .iter()
            .find(|rule| (rule.predicate)(statistic))
            .map_or(self.fallback, |rule| rule.label)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_returns_fallback() {
        let table: RuleTable<u32, &str> = RuleTable::new("none");
        assert!(table.is_empty());
        assert_eq!(table.evaluate(&7), "none");
    }

    #[test]
    fn first_match_wins() {
        let table = RuleTable::<u32, &str>::new("low")
            .rule(|n: &u32| *n > 20, "severe")
            .rule(|n: &u32| *n > 10, "moderate");
        assert_eq!(table.len(), 2);
        assert_eq!(table.evaluate(&25), "severe");
        assert_eq!(table.evaluate(&20), "moderate");
        assert_eq!(table.evaluate(&11), "moderate");
        assert_eq!(table.evaluate(&10), "low");
    }

    #[test]
    fn order_matters() {
        let shadowed = RuleTable::<u32, &str>::new("low")
            .rule(|n: &u32| *n > 10, "moderate")
            .rule(|n: &u32| *n > 20, "severe");
        assert_eq!(shadowed.evaluate(&25), "moderate");
    }
}
