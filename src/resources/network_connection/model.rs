use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConnectionModel {
    pub id: Option<String>,
    pub network_id: Option<String>,
    pub description: Option<String>,
    pub connection_spec: Option<ConnectionSpecModel>,
    pub status: Option<String>,
    pub status_reason: Option<String>,
}

/// Holds exactly one of `aws` or `google`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSpecModel {
    pub aws: Option<AwsModel>,
    pub google: Option<GoogleModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsModel {
    pub peering: Option<AwsPeeringModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsPeeringModel {
    pub vpc_id: Option<String>,
    pub account_id: Option<String>,
    pub region_id: Option<String>,
    pub ipv4_cidr_block: Option<String>,
    pub ipv6_cidr_block: Option<String>,
    pub peering_connection_id: Option<String>,
    pub managed_ipv4_cidr_block: Option<String>,
    pub managed_ipv6_cidr_block: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleModel {
    pub name: Option<String>,
    pub peer_network_url: Option<String>,
    pub managed_ipv4_cidr_block: Option<String>,
}
