use crate::backend::metadata::ProposalMetadata;
use crate::backend::proposal::{parse_u256, ProposalCall, ProposalOption};
use crate::backend::subgraph::RawProposal;
use crate::error::{Error, Result};
use crate::i18n::I18n;

/// Splits a proposal's calls into its vote options.
///
/// Option 0 is always the "against" option and carries no calls. The
/// remaining options share the `(to, data, value)` triples evenly, in order.
pub fn enumerate_options(
    raw: &RawProposal,
    metadata: Option<&ProposalMetadata>,
    i18n: &I18n,
) -> Result<Vec<ProposalOption>> {
    let malformed = |reason: String| Error::MalformedProposal {
        id: raw.id.clone(),
        reason,
    };

    let option_count = raw.total_votes.len();
    if option_count == 0 {
        return Ok(Vec::new());
    }

    let call_count = raw.target.len();
    if raw.calldata.len() != call_count || raw.value.len() != call_count {
        return Err(malformed(format!(
            "{} targets, {} calldata, {} values",
            call_count,
            raw.calldata.len(),
            raw.value.len()
        )));
    }

    let action_options = option_count - 1;
    let calls_per_option = match action_options {
        0 if call_count == 0 => 0,
        0 => return Err(malformed("calls without an action option".to_string())),
        n if call_count % n != 0 => {
            return Err(malformed(format!(
                "{} calls cannot be split across {} options",
                call_count, n
            )))
        }
        n => call_count / n,
    };

    let mut calls = Vec::with_capacity(call_count);
    for i in 0..call_count {
        calls.push(ProposalCall {
            target: raw.target[i].clone(),
            calldata: raw.calldata[i].clone(),
            value: parse_u256("value", &raw.value[i])?,
        });
    }

    let mut options = Vec::with_capacity(option_count);
    for (index, votes) in raw.total_votes.iter().enumerate() {
        let label = match metadata.and_then(|m| m.option_label(index)) {
            Some(label) => label.to_string(),
            None if index == 0 => i18n.t("against"),
            None => format!("Option {}", index),
        };
        let option_calls = if index == 0 {
            Vec::new()
        } else {
            let start = (index - 1) * calls_per_option;
            calls[start..start + calls_per_option].to_vec()
        };
        options.push(ProposalOption {
            id: index as u32,
            label,
            total_votes: parse_u256("totalVotes", votes)?,
            calls: option_calls,
        });
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethnum::U256;

    fn i18n() -> I18n {
        I18n::new("en-US", &["en-US".to_string()])
    }

    fn raw(total_votes: &[&str], calls: usize) -> RawProposal {
        RawProposal {
            id: "0xproposal".to_string(),
            creator: "0xcreator".to_string(),
            start_time: "0".to_string(),
            end_time: "0".to_string(),
            target: (0..calls).map(|i| format!("0xtarget{}", i)).collect(),
            calldata: (0..calls).map(|i| format!("0xdata{}", i)).collect(),
            value: (0..calls).map(|i| i.to_string()).collect(),
            title: String::new(),
            content_hash: String::new(),
            contract_state: "1".to_string(),
            total_votes: total_votes.iter().map(|s| s.to_string()).collect(),
            votes: vec![],
        }
    }

    #[test]
    fn test_calls_split_evenly_across_action_options() {
        let proposal = raw(&["5", "10", "15"], 4);
        let meta = ProposalMetadata {
            description: None,
            vote_options: vec!["No".to_string(), "Plan A".to_string()],
        };
        let options = enumerate_options(&proposal, Some(&meta), &i18n()).expect("options");

        assert_eq!(options.len(), 3);
        assert_eq!(options[0].label, "No");
        assert!(options[0].calls.is_empty());
        assert_eq!(options[1].label, "Plan A");
        assert_eq!(options[1].calls.len(), 2);
        assert_eq!(options[1].calls[0].target, "0xtarget0");
        assert_eq!(options[2].label, "Option 2");
        assert_eq!(options[2].calls[1].calldata, "0xdata3");
        assert_eq!(options[2].calls[1].value, U256::from(3u32));
        assert_eq!(options[2].total_votes, U256::from(15u32));
    }

    #[test]
    fn test_against_label_without_metadata() {
        let options = enumerate_options(&raw(&["0", "0"], 1), None, &i18n()).expect("options");
        assert_eq!(options[0].label, "Against");
        assert_eq!(options[1].calls.len(), 1);
    }

    #[test]
    fn test_uneven_split_is_rejected() {
        let err = enumerate_options(&raw(&["0", "0", "0"], 3), None, &i18n()).unwrap_err();
        assert!(matches!(err, Error::MalformedProposal { .. }));
    }

    #[test]
    fn test_mismatched_call_arrays_are_rejected() {
        let mut proposal = raw(&["0", "0"], 2);
        proposal.value.pop();
        assert!(enumerate_options(&proposal, None, &i18n()).is_err());
    }

    #[test]
    fn test_no_options() {
        assert!(enumerate_options(&raw(&[], 0), None, &i18n()).expect("options").is_empty());
    }
}
