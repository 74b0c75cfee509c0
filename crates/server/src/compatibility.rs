//! Blood group parsing and medical compatibility rules.
//!
//! The compatibility table maps a recipient's blood group to the donor groups
//! whose blood they can receive. Donor search uses it to widen a query beyond
//! exact-group matches; the emergency dispatcher itself matches exact groups
//! only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Duration, OffsetDateTime};
use utoipa::ToSchema;

/// Minimum interval between whole-blood donations. Donors who gave blood more
/// recently are not eligible to donate again yet.
pub const MIN_DONATION_INTERVAL: Duration = Duration::days(56);

/// The eight ABO/Rh blood groups.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "O-")]
    ONeg,
}

impl BloodGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APos => "A+",
            BloodGroup::ANeg => "A-",
            BloodGroup::BPos => "B+",
            BloodGroup::BNeg => "B-",
            BloodGroup::AbPos => "AB+",
            BloodGroup::AbNeg => "AB-",
            BloodGroup::OPos => "O+",
            BloodGroup::ONeg => "O-",
        }
    }

    /// Donor groups whose blood a recipient of this group can receive.
    pub fn compatible_donors(&self) -> &'static [BloodGroup] {
        use BloodGroup::*;
        match self {
            APos => &[APos, ANeg, OPos, ONeg],
            ANeg => &[ANeg, ONeg],
            BPos => &[BPos, BNeg, OPos, ONeg],
            BNeg => &[BNeg, ONeg],
            AbPos => &[APos, ANeg, BPos, BNeg, AbPos, AbNeg, OPos, ONeg],
            AbNeg => &[ANeg, BNeg, AbNeg, ONeg],
            OPos => &[OPos, ONeg],
            ONeg => &[ONeg],
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A+" => Ok(BloodGroup::APos),
            "A-" => Ok(BloodGroup::ANeg),
            "B+" => Ok(BloodGroup::BPos),
            "B-" => Ok(BloodGroup::BNeg),
            "AB+" => Ok(BloodGroup::AbPos),
            "AB-" => Ok(BloodGroup::AbNeg),
            "O+" => Ok(BloodGroup::OPos),
            "O-" => Ok(BloodGroup::ONeg),
            other => Err(format!("Unknown blood group: {other}")),
        }
    }
}

/// Whether a donor with this last-donation timestamp may donate at `now`.
pub fn eligible_to_donate(last_donation_at: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
    match last_donation_at {
        Some(last) => now - last >= MIN_DONATION_INTERVAL,
        None => true,
    }
}

/// Rank a donor for search results. Exact-group matches always outrank
/// merely-compatible ones; within a band, donors whose last donation is
/// further in the past score higher (they are "fresher" for the next one).
pub fn match_score(
    donor_group: BloodGroup,
    wanted: BloodGroup,
    last_donation_at: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> i64 {
    let base = if donor_group == wanted { 1_000_000 } else { 0 };
    let recency = match last_donation_at {
        Some(last) => (now - last).whole_days().clamp(0, 365),
        None => 365,
    };
    base + recency
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn o_neg_is_universal_donor() {
        for group in [
            BloodGroup::APos,
            BloodGroup::ANeg,
            BloodGroup::BPos,
            BloodGroup::BNeg,
            BloodGroup::AbPos,
            BloodGroup::AbNeg,
            BloodGroup::OPos,
            BloodGroup::ONeg,
        ] {
            assert!(group.compatible_donors().contains(&BloodGroup::ONeg));
        }
    }

    #[test]
    fn ab_pos_is_universal_recipient() {
        assert_eq!(BloodGroup::AbPos.compatible_donors().len(), 8);
    }

    #[test]
    fn o_neg_only_receives_o_neg() {
        assert_eq!(BloodGroup::ONeg.compatible_donors(), &[BloodGroup::ONeg]);
    }

    #[test]
    fn parse_round_trips() {
        for s in ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"] {
            let group: BloodGroup = s.parse().unwrap();
            assert_eq!(group.as_str(), s);
        }
        assert!("C+".parse::<BloodGroup>().is_err());
        assert_eq!("ab+".parse::<BloodGroup>().unwrap(), BloodGroup::AbPos);
    }

    #[test]
    fn recent_donor_is_ineligible() {
        let now = datetime!(2025-08-01 12:00 UTC);
        assert!(!eligible_to_donate(
            Some(datetime!(2025-07-20 12:00 UTC)),
            now
        ));
        assert!(eligible_to_donate(
            Some(datetime!(2025-05-01 12:00 UTC)),
            now
        ));
        assert!(eligible_to_donate(None, now));
    }

    #[test]
    fn exact_match_outranks_compatible() {
        let now = datetime!(2025-08-01 12:00 UTC);
        let exact = match_score(
            BloodGroup::OPos,
            BloodGroup::OPos,
            Some(datetime!(2025-07-30 12:00 UTC)),
            now,
        );
        let compatible = match_score(BloodGroup::ONeg, BloodGroup::OPos, None, now);
        assert!(exact > compatible);
    }
}
