//! Rule resolution with a fallback chain.
//!
//! A request is matched against the table tier by tier. Each tier loosens
//! the conditions of the one before it:
//!
//! 1. `exact`: width, surface, drainage, flood risk (when known) and activity
//! 2. `activity_relaxed`: activity ignored
//! 3. `risk_relaxed`: activity and flood risk ignored
//! 4. `nearest_width`: surface and drainage at the closest width
//! 5. `first_row`: the first rule of the table
//!
//! The last tier always succeeds, so resolution never fails.

use std::sync::Arc;

use bedah_gang_design_models::{DesignRequest, DesignRule, MatchKind, Resolution};

use crate::table::{RuleSet, RuleTable};

/// Conditions derived from a [`DesignRequest`] once per resolution.
struct Criteria<'a> {
    request: &'a DesignRequest,
    activity_flag: bool,
    width_tolerance: Option<f64>,
}

impl Criteria<'_> {
    #[allow(clippy::float_cmp)]
    fn width_matches(&self, width: f64) -> bool {
        match self.width_tolerance {
            Some(tolerance) => (width - self.request.width).abs() <= tolerance,
            None => width == self.request.width,
        }
    }

    fn site_matches(&self, rule: &DesignRule) -> bool {
        rule.surface == self.request.surface && rule.drainage == self.request.drainage
    }

    /// An unset risk flag matches either value.
    fn risk_matches(&self, rule: &DesignRule) -> bool {
        self.request
            .high_flood_risk
            .is_none_or(|risk| risk == rule.high_flood_risk)
    }

    fn describe(&self) -> String {
        let risk = self
            .request
            .high_flood_risk
            .map_or_else(|| "unknown".to_string(), |r| r.to_string());
        format!(
            "width={}, surface={}, drainage={}, high_flood_risk={risk}, activity={}",
            self.request.width, self.request.surface, self.request.drainage, self.activity_flag
        )
    }
}

/// One tier of the fallback chain.
trait MatchStrategy: Send + Sync {
    fn kind(&self) -> MatchKind;

    /// What this tier ignores, for diagnostics.
    fn relaxation(&self) -> &'static str;

    fn select<'r>(&self, rules: &'r RuleSet, criteria: &Criteria<'_>) -> Option<&'r DesignRule>;
}

/// First rule matching width, site, and optionally risk and activity.
struct ConditionMatch {
    kind: MatchKind,
    relaxation: &'static str,
    match_risk: bool,
    match_activity: bool,
}

impl MatchStrategy for ConditionMatch {
    fn kind(&self) -> MatchKind {
        self.kind
    }

    fn relaxation(&self) -> &'static str {
        self.relaxation
    }

    fn select<'r>(&self, rules: &'r RuleSet, criteria: &Criteria<'_>) -> Option<&'r DesignRule> {
        rules.iter().find(|rule| {
            criteria.width_matches(rule.width)
                && criteria.site_matches(rule)
                && (!self.match_risk || criteria.risk_matches(rule))
                && (!self.match_activity || rule.activity_flag == criteria.activity_flag)
        })
    }
}

/// Rule with matching site whose width is closest to the request.
struct NearestWidth;

impl MatchStrategy for NearestWidth {
    fn kind(&self) -> MatchKind {
        MatchKind::NearestWidth
    }

    fn relaxation(&self) -> &'static str {
        "width, activity and flood risk ignored, nearest width with same surface and drainage"
    }

    fn select<'r>(&self, rules: &'r RuleSet, criteria: &Criteria<'_>) -> Option<&'r DesignRule> {
        let target = criteria.request.width;
        // `min_by` keeps the first of equally distant rules.
        rules
            .iter()
            .filter(|rule| criteria.site_matches(rule))
            .min_by(|a, b| (a.width - target).abs().total_cmp(&(b.width - target).abs()))
    }
}

fn default_chain() -> Vec<Box<dyn MatchStrategy>> {
    vec![
        Box::new(ConditionMatch {
            kind: MatchKind::Exact,
            relaxation: "all conditions",
            match_risk: true,
            match_activity: true,
        }),
        Box::new(ConditionMatch {
            kind: MatchKind::ActivityRelaxed,
            relaxation: "activity ignored",
            match_risk: true,
            match_activity: false,
        }),
        Box::new(ConditionMatch {
            kind: MatchKind::RiskRelaxed,
            relaxation: "activity and flood risk ignored",
            match_risk: false,
            match_activity: false,
        }),
        Box::new(NearestWidth),
    ]
}

/// Selects the design rule for a surveyed gang.
pub struct RuleResolver {
    table: Arc<RuleTable>,
    width_tolerance: Option<f64>,
    chain: Vec<Box<dyn MatchStrategy>>,
}

impl std::fmt::Debug for RuleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleResolver")
            .field("source", self.table.source())
            .field("width_tolerance", &self.width_tolerance)
            .finish_non_exhaustive()
    }
}

impl RuleResolver {
    /// Creates a resolver over `table` that matches widths exactly.
    #[must_use]
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self {
            table,
            width_tolerance: None,
            chain: default_chain(),
        }
    }

    /// Treats widths within `tolerance` meters of the request as equal in
    /// the condition-matching tiers.
    ///
    /// A negative or non-finite tolerance falls back to exact matching.
    #[must_use]
    pub fn with_width_tolerance(mut self, tolerance: f64) -> Self {
        self.width_tolerance = (tolerance.is_finite() && tolerance >= 0.0).then_some(tolerance);
        self
    }

    /// The table this resolver reads from.
    #[must_use]
    pub const fn table(&self) -> &Arc<RuleTable> {
        &self.table
    }

    /// Resolves `request` against the table's current rules.
    #[must_use]
    pub fn resolve(&self, request: &DesignRequest) -> Resolution {
        let rules = self.table.rules();
        self.resolve_in(&rules, request)
    }

    /// Resolves `request` against an explicit rule set.
    #[must_use]
    pub fn resolve_in(&self, rules: &RuleSet, request: &DesignRequest) -> Resolution {
        let criteria = Criteria {
            request,
            activity_flag: request.activity_flag(),
            width_tolerance: self.width_tolerance,
        };
        let mut diagnostics = Vec::new();

        for strategy in &self.chain {
            let kind = strategy.kind();
            if let Some(rule) = strategy.select(rules, &criteria) {
                diagnostics.push(format!(
                    "{kind}: matched module {} at width {} ({})",
                    rule.design_module,
                    rule.width,
                    strategy.relaxation()
                ));
                log::debug!(
                    "Resolved {} to module {} via {kind}",
                    criteria.describe(),
                    rule.design_module
                );
                return Resolution {
                    rule: rule.clone(),
                    match_kind: kind,
                    diagnostics,
                };
            }
            diagnostics.push(format!(
                "{kind}: no rule for {} ({})",
                criteria.describe(),
                strategy.relaxation()
            ));
        }

        let rule = rules.first();
        diagnostics.push(format!(
            "{}: using module {} from the first rule of the table",
            MatchKind::FirstRow,
            rule.design_module
        ));
        log::warn!(
            "No design rule for surface={} drainage={}, falling back to first rule",
            request.surface,
            request.drainage
        );
        Resolution {
            rule: rule.clone(),
            match_kind: MatchKind::FirstRow,
            diagnostics,
        }
    }
}
