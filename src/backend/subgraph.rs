use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use crate::error::{Error, Result};

const PROPOSAL_QUERY: &str = r#"
query getProposal($id: ID!, $proposalId: ID!) {
  guild(id: $id) {
    proposals(where: { id: $proposalId }) {
      id
      creator
      startTime
      endTime
      to
      data
      value
      title
      contentHash
      contractState
      totalVotes
      votes { voter option votingPower }
    }
  }
}
"#;

const ACTIVE_PROPOSALS_QUERY: &str = r#"
query getNumberOfActiveProposals($id: ID!) {
  guild(id: $id) {
    proposals(where: { contractState: 1 }) { id }
  }
}
"#;

const TOTAL_LOCKED_QUERY: &str = r#"
query getTotalLocked($id: ID!) {
  guild(id: $id) { totalLocked }
}
"#;

/// Indexer values typed as BigInt come back as strings, some deployments
/// emit plain numbers.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

fn strings_or_numbers<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrap(#[serde(deserialize_with = "string_or_number")] String);
    let items: Vec<Wrap> = Vec::deserialize(deserializer)?;
    Ok(items.into_iter().map(|w| w.0).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVote {
    pub voter: String,
    #[serde(deserialize_with = "string_or_number")]
    pub option: String,
    #[serde(deserialize_with = "string_or_number")]
    pub voting_power: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProposal {
    pub id: String,
    pub creator: String,
    #[serde(deserialize_with = "string_or_number")]
    pub start_time: String,
    #[serde(deserialize_with = "string_or_number")]
    pub end_time: String,
    #[serde(rename = "to", default)]
    pub target: Vec<String>,
    #[serde(rename = "data", default)]
    pub calldata: Vec<String>,
    #[serde(default, deserialize_with = "strings_or_numbers")]
    pub value: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content_hash: String,
    #[serde(deserialize_with = "string_or_number")]
    pub contract_state: String,
    #[serde(default, deserialize_with = "strings_or_numbers")]
    pub total_votes: Vec<String>,
    #[serde(default)]
    pub votes: Vec<RawVote>,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct GuildData<G> {
    guild: Option<G>,
}

#[derive(Deserialize)]
struct ProposalsGuild {
    proposals: Vec<RawProposal>,
}

#[derive(Deserialize)]
struct ProposalIdsGuild {
    proposals: Vec<ProposalId>,
}

#[derive(Deserialize)]
struct ProposalId {
    #[allow(dead_code)]
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalLockedGuild {
    #[serde(default, deserialize_with = "option_string_or_number")]
    total_locked: Option<String>,
}

fn option_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrap(#[serde(deserialize_with = "string_or_number")] String);
    Ok(Option::<Wrap>::deserialize(deserializer)?.map(|w| w.0))
}

/// Validates a 0x-prefixed hex id of `len` bytes and lowercases it, the way
/// the indexer stores ids.
pub fn normalize_id(value: &str, len: usize) -> Result<String> {
    let body = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| Error::InvalidId(value.to_string()))?;
    let bytes = hex::decode(body).map_err(|_| Error::InvalidId(value.to_string()))?;
    if bytes.len() != len {
        return Err(Error::InvalidId(value.to_string()));
    }
    Ok(format!("0x{}", hex::encode(bytes)))
}

pub fn normalize_address(value: &str) -> Result<String> {
    normalize_id(value, 20)
}

pub fn normalize_proposal_id(value: &str) -> Result<String> {
    normalize_id(value, 32)
}

fn into_data<T>(response: GraphqlResponse<T>) -> Result<Option<T>> {
    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(Error::Graphql(messages.join("; ")));
    }
    Ok(response.data)
}

pub fn parse_proposal_response(body: &str) -> Result<Option<RawProposal>> {
    let response: GraphqlResponse<GuildData<ProposalsGuild>> = serde_json::from_str(body)?;
    Ok(into_data(response)?
        .and_then(|d| d.guild)
        .and_then(|g| g.proposals.into_iter().next()))
}

pub fn parse_active_proposals_response(body: &str) -> Result<Option<usize>> {
    let response: GraphqlResponse<GuildData<ProposalIdsGuild>> = serde_json::from_str(body)?;
    Ok(into_data(response)?
        .and_then(|d| d.guild)
        .map(|g| g.proposals.len()))
}

pub fn parse_total_locked_response(body: &str) -> Result<Option<String>> {
    let response: GraphqlResponse<GuildData<TotalLockedGuild>> = serde_json::from_str(body)?;
    Ok(into_data(response)?
        .and_then(|d| d.guild)
        .and_then(|g| g.total_locked))
}

#[derive(Clone)]
pub struct SubgraphClient {
    http: reqwest::Client,
    url: String,
}

impl SubgraphClient {
    pub fn new(url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    async fn post(&self, query: &str, variables: serde_json::Value) -> Result<String> {
        let body = json!({ "query": query, "variables": variables });
        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.text().await?)
    }

    pub async fn proposal(&self, dao_id: &str, proposal_id: &str) -> Result<Option<RawProposal>> {
        let variables = json!({
            "id": normalize_address(dao_id)?,
            "proposalId": normalize_proposal_id(proposal_id)?,
        });
        let body = self.post(PROPOSAL_QUERY, variables).await?;
        parse_proposal_response(&body)
    }

    pub async fn active_proposals(&self, dao_id: &str) -> Result<Option<usize>> {
        let variables = json!({ "id": normalize_address(dao_id)? });
        let body = self.post(ACTIVE_PROPOSALS_QUERY, variables).await?;
        parse_active_proposals_response(&body)
    }

    pub async fn total_locked(&self, dao_id: &str) -> Result<Option<String>> {
        let variables = json!({ "id": normalize_address(dao_id)? });
        let body = self.post(TOTAL_LOCKED_QUERY, variables).await?;
        parse_total_locked_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROPOSAL_BODY: &str = r#"{
      "data": {
        "guild": {
          "proposals": [{
            "id": "0xabc",
            "creator": "0x1111111111111111111111111111111111111111",
            "startTime": "1672531200",
            "endTime": 1673136000,
            "to": ["0x2222222222222222222222222222222222222222"],
            "data": ["0x"],
            "value": ["0"],
            "title": "Fund the grants round",
            "contentHash": "ipfs://QmHash",
            "contractState": "1",
            "totalVotes": ["10", "90"],
            "votes": [{ "voter": "0x33", "option": "1", "votingPower": "90" }]
          }]
        }
      }
    }"#;

    #[test]
    fn test_parse_proposal_accepts_strings_and_numbers() {
        let proposal = parse_proposal_response(PROPOSAL_BODY)
            .expect("parse")
            .expect("proposal present");
        assert_eq!(proposal.start_time, "1672531200");
        assert_eq!(proposal.end_time, "1673136000");
        assert_eq!(proposal.target.len(), 1);
        assert_eq!(proposal.calldata, vec!["0x".to_string()]);
        assert_eq!(proposal.contract_state, "1");
        assert_eq!(proposal.votes[0].option, "1");
    }

    #[test]
    fn test_missing_guild_is_none() {
        let parsed = parse_proposal_response(r#"{"data": {"guild": null}}"#).expect("parse");
        assert!(parsed.is_none());
        let parsed =
            parse_proposal_response(r#"{"data": {"guild": {"proposals": []}}}"#).expect("parse");
        assert!(parsed.is_none());
    }

    #[test]
    fn test_graphql_errors_are_surfaced() {
        let err = parse_proposal_response(r#"{"errors": [{"message": "indexing error"}]}"#)
            .unwrap_err();
        match err {
            Error::Graphql(msg) => assert_eq!(msg, "indexing error"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_active_proposal_count() {
        let body = r#"{"data": {"guild": {"proposals": [{"id": "0x1"}, {"id": "0x2"}]}}}"#;
        assert_eq!(parse_active_proposals_response(body).expect("parse"), Some(2));
    }

    #[test]
    fn test_total_locked() {
        let body = r#"{"data": {"guild": {"totalLocked": "1000000000000000000"}}}"#;
        assert_eq!(
            parse_total_locked_response(body).expect("parse").as_deref(),
            Some("1000000000000000000")
        );
    }

    #[test]
    fn test_normalize_ids() {
        assert_eq!(
            normalize_address("0xABCDEFabcdef0123456789012345678901234567").expect("valid"),
            "0xabcdefabcdef0123456789012345678901234567"
        );
        assert!(normalize_address("abcdef").is_err());
        assert!(normalize_address("0x1234").is_err());
        assert!(normalize_proposal_id(&format!("0x{}", "ab".repeat(32))).is_ok());
    }
}
