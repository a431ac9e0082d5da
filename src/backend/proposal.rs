use std::fmt;
use chrono::{DateTime, Utc};
use ethnum::U256;
use crate::backend::metadata::ProposalMetadata;
use crate::backend::subgraph::RawProposal;
use crate::error::{Error, Result};
use crate::i18n::I18n;

pub const VOTING_POWER_PRECISION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractState {
    Active,
    Rejected,
    Executed,
    Failed,
    /// Any code outside 1..=4.
    Unknown,
}

impl ContractState {
    pub fn from_code(code: &str) -> Self {
        match code.trim().parse::<u32>() {
            Ok(1) => ContractState::Active,
            Ok(2) => ContractState::Rejected,
            Ok(3) => ContractState::Executed,
            Ok(4) => ContractState::Failed,
            _ => {
                tracing::warn!(code, "unmapped proposal contract state");
                ContractState::Unknown
            }
        }
    }

    pub fn label(&self, i18n: &I18n) -> String {
        match self {
            ContractState::Active => i18n.t("contractState.Active"),
            ContractState::Rejected => i18n.t("contractState.Rejected"),
            ContractState::Executed => i18n.t("contractState.Executed"),
            ContractState::Failed => i18n.t("contractState.Failed"),
            ContractState::Unknown => i18n.t("unknown"),
        }
    }
}

/// Share of a total scaled by `10^precision`, truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percentage {
    scaled: U256,
    precision: u32,
}

impl Percentage {
    /// `None` when `total` is zero or the intermediate product overflows.
    pub fn of(value: U256, total: U256, precision: u32) -> Option<Self> {
        if total == U256::ZERO {
            return None;
        }
        let scale = U256::from(10u32).checked_pow(precision)?;
        let scaled = value
            .checked_mul(U256::from(100u32))?
            .checked_mul(scale)?
            / total;
        Some(Self { scaled, precision })
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.precision == 0 {
            return write!(f, "{}", self.scaled);
        }
        let scale = U256::from(10u32).pow(self.precision);
        write!(
            f,
            "{}.{:0width$}",
            self.scaled / scale,
            (self.scaled % scale).as_u64(),
            width = self.precision as usize
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProposalVote {
    pub voter: String,
    pub option_label: String,
    /// Absent while the total locked weight is unknown.
    pub voting_power: Option<Percentage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProposalCall {
    pub target: String,
    pub calldata: String,
    pub value: U256,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProposalOption {
    pub id: u32,
    pub label: String,
    pub total_votes: U256,
    pub calls: Vec<ProposalCall>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProposalViewModel {
    pub id: String,
    pub creator: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub target: Vec<String>,
    pub calldata: Vec<String>,
    pub value: Vec<String>,
    pub title: String,
    pub content_hash: String,
    pub contract_state: ContractState,
    pub total_votes: Vec<U256>,
    pub votes: Vec<ProposalVote>,
    /// Filled in by `merge_options` once the options are enumerated.
    pub options: Option<Vec<ProposalOption>>,
    /// Only read by deploy tooling.
    pub total_options: Option<u32>,
}

impl ProposalViewModel {
    /// Second build phase. `None` leaves previously merged options in place.
    pub fn merge_options(mut self, options: Option<Vec<ProposalOption>>) -> Self {
        if let Some(options) = options {
            self.options = Some(options);
        }
        self
    }

    pub fn is_active(&self) -> bool {
        self.contract_state == ContractState::Active
    }
}

pub fn parse_u256(field: &'static str, value: &str) -> Result<U256> {
    U256::from_str_radix(value.trim(), 10).map_err(|_| Error::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

pub fn parse_index(field: &'static str, value: &str) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|_| Error::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>> {
    let invalid = || Error::InvalidNumber {
        field,
        value: value.to_string(),
    };
    let secs = value.trim().parse::<i64>().map_err(|_| invalid())?;
    DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(invalid)
}

/// Builds the view model for a fetched proposal. Call again whenever the raw
/// proposal, the metadata, the total locked weight or the locale changes.
pub fn build_proposal(
    raw: Option<&RawProposal>,
    metadata: Option<&ProposalMetadata>,
    total_locked: Option<U256>,
    i18n: &I18n,
) -> Result<Option<ProposalViewModel>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let total_votes = raw
        .total_votes
        .iter()
        .map(|v| parse_u256("totalVotes", v))
        .collect::<Result<Vec<_>>>()?;

    let votes = raw
        .votes
        .iter()
        .map(|vote| {
            let option = parse_index("votes.option", &vote.option)?;
            let option_label = metadata
                .and_then(|m| m.option_label(option))
                .map(|s| s.to_string())
                .unwrap_or_else(|| i18n.t("against"));
            let power = parse_u256("votes.votingPower", &vote.voting_power)?;
            let voting_power =
                total_locked.and_then(|total| Percentage::of(power, total, VOTING_POWER_PRECISION));
            Ok(ProposalVote {
                voter: vote.voter.clone(),
                option_label,
                voting_power,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(ProposalViewModel {
        id: raw.id.clone(),
        creator: raw.creator.clone(),
        start_time: parse_timestamp("startTime", &raw.start_time)?,
        end_time: parse_timestamp("endTime", &raw.end_time)?,
        target: raw.target.clone(),
        calldata: raw.calldata.clone(),
        value: raw.value.clone(),
        title: raw.title.clone(),
        content_hash: raw.content_hash.clone(),
        contract_state: ContractState::from_code(&raw.contract_state),
        total_votes,
        votes,
        options: None,
        total_options: None,
    }))
}
