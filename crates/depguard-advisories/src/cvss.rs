//! CVSS v3.1 base-score vector parser (§9 supplement): advisories often
//! ship a vector string instead of a pre-computed score; this recomputes
//! the base score so `Advisory.cvss` is never left `None` just because a
//! source only gave us the vector.

use depguard_core::DepGuardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttackVector {
    Network,
    Adjacent,
    Local,
    Physical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttackComplexity {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrivilegesRequired {
    None,
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserInteraction {
    None,
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Unchanged,
    Changed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImpactMetric {
    None,
    Low,
    High,
}

#[derive(Debug, Clone, Copy)]
pub struct Cvss3Vector {
    av: AttackVector,
    ac: AttackComplexity,
    pr: PrivilegesRequired,
    ui: UserInteraction,
    scope: Scope,
    c: ImpactMetric,
    i: ImpactMetric,
    a: ImpactMetric,
}

impl Cvss3Vector {
    pub fn parse(vector: &str) -> Result<Self, DepGuardError> {
        let mut av = None;
        let mut ac = None;
        let mut pr = None;
        let mut ui = None;
        let mut scope = None;
        let mut c = None;
        let mut i = None;
        let mut a = None;

        for segment in vector.split('/') {
            let Some((key, value)) = segment.split_once(':') else {
                continue;
            };
            match key {
                "AV" => av = parse_av(value),
                "AC" => ac = parse_ac(value),
                "PR" => pr = parse_pr(value),
                "UI" => ui = parse_ui(value),
                "S" => scope = parse_scope(value),
                "C" => c = parse_impact(value),
                "I" => i = parse_impact(value),
                "A" => a = parse_impact(value),
                _ => {}
            }
        }

        let missing = || DepGuardError::ValidationError {
            details: format!("incomplete CVSS v3.1 vector: {vector}"),
        };

        Ok(Self {
            av: av.ok_or_else(missing)?,
            ac: ac.ok_or_else(missing)?,
            pr: pr.ok_or_else(missing)?,
            ui: ui.ok_or_else(missing)?,
            scope: scope.ok_or_else(missing)?,
            c: c.ok_or_else(missing)?,
            i: i.ok_or_else(missing)?,
            a: a.ok_or_else(missing)?,
        })
    }

    /// CVSS v3.1 base-score formula, official coefficients.
    pub fn base_score(&self) -> f64 {
        let (c, i, a) = (impact_weight(self.c), impact_weight(self.i), impact_weight(self.a));
        let iss = 1.0 - ((1.0 - c) * (1.0 - i) * (1.0 - a));

        let impact = match self.scope {
            Scope::Unchanged => 6.42 * iss,
            Scope::Changed => 7.52 * (iss - 0.029) - 3.25 * (iss - 0.02).powf(15.0),
        };

        if impact <= 0.0 {
            return 0.0;
        }

        let exploitability = 8.22 * av_weight(self.av) * ac_weight(self.ac) * pr_weight(self.pr, self.scope) * ui_weight(self.ui);

        let raw = match self.scope {
            Scope::Unchanged => (impact + exploitability).min(10.0),
            Scope::Changed => (1.08 * (impact + exploitability)).min(10.0),
        };

        roundup(raw)
    }
}

/// CVSS's official "round up to the nearest tenth" rule, which differs
/// from ordinary rounding at the boundary (e.g. 4.02 rounds up to 4.1, not
/// down to 4.0).
fn roundup(input: f64) -> f64 {
    let scaled = (input * 100_000.0).round() as i64;
    if scaled % 10_000 == 0 {
        scaled as f64 / 100_000.0
    } else {
        ((scaled / 10_000) + 1) as f64 / 10.0
    }
}

fn parse_av(v: &str) -> Option<AttackVector> {
    Some(match v {
        "N" => AttackVector::Network,
        "A" => AttackVector::Adjacent,
        "L" => AttackVector::Local,
        "P" => AttackVector::Physical,
        _ => return None,
    })
}

fn parse_ac(v: &str) -> Option<AttackComplexity> {
    Some(match v {
        "L" => AttackComplexity::Low,
        "H" => AttackComplexity::High,
        _ => return None,
    })
}

fn parse_pr(v: &str) -> Option<PrivilegesRequired> {
    Some(match v {
        "N" => PrivilegesRequired::None,
        "L" => PrivilegesRequired::Low,
        "H" => PrivilegesRequired::High,
        _ => return None,
    })
}

fn parse_ui(v: &str) -> Option<UserInteraction> {
    Some(match v {
        "N" => UserInteraction::None,
        "R" => UserInteraction::Required,
        _ => return None,
    })
}

fn parse_scope(v: &str) -> Option<Scope> {
    Some(match v {
        "U" => Scope::Unchanged,
        "C" => Scope::Changed,
        _ => return None,
    })
}

fn parse_impact(v: &str) -> Option<ImpactMetric> {
    Some(match v {
        "N" => ImpactMetric::None,
        "L" => ImpactMetric::Low,
        "H" => ImpactMetric::High,
        _ => return None,
    })
}

fn av_weight(av: AttackVector) -> f64 {
    match av {
        AttackVector::Network => 0.85,
        AttackVector::Adjacent => 0.62,
        AttackVector::Local => 0.55,
        AttackVector::Physical => 0.2,
    }
}

fn ac_weight(ac: AttackComplexity) -> f64 {
    match ac {
        AttackComplexity::Low => 0.77,
        AttackComplexity::High => 0.44,
    }
}

fn pr_weight(pr: PrivilegesRequired, scope: Scope) -> f64 {
    match (pr, scope) {
        (PrivilegesRequired::None, _) => 0.85,
        (PrivilegesRequired::Low, Scope::Unchanged) => 0.62,
        (PrivilegesRequired::Low, Scope::Changed) => 0.68,
        (PrivilegesRequired::High, Scope::Unchanged) => 0.27,
        (PrivilegesRequired::High, Scope::Changed) => 0.5,
    }
}

fn ui_weight(ui: UserInteraction) -> f64 {
    match ui {
        UserInteraction::None => 0.85,
        UserInteraction::Required => 0.62,
    }
}

fn impact_weight(metric: ImpactMetric) -> f64 {
    match metric {
        ImpactMetric::None => 0.0,
        ImpactMetric::Low => 0.22,
        ImpactMetric::High => 0.56,
    }
}

/// Parse a vector and return its base score in one call.
pub fn base_score_from_vector(vector: &str) -> Result<f64, DepGuardError> {
    Cvss3Vector::parse(vector).map(|v| v.base_score())
}
