//! Network service: networks and network connections

use super::client::DcClient;
use super::error::Result;
use super::operation::Operation;
use super::pager::{Named, Pager};
use serde::{Deserialize, Serialize};

// =============================================================================
// Networks
// =============================================================================

/// Network as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Network {
    pub id: String,
    pub project_id: String,
    pub cloud_type: String,
    pub region_id: String,
    pub name: String,
    pub description: String,
    pub ipv4_cidr_block: String,
    pub ipv6_cidr_block: String,
    pub status: String,
}

impl Named for Network {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNetworkRequest {
    pub project_id: String,
    pub cloud_type: String,
    pub region_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub ipv4_cidr_block: String,
}

pub async fn create_network(client: &DcClient, request: &CreateNetworkRequest) -> Result<Operation> {
    client.post(&client.network_url("networks"), request).await
}

pub async fn get_network(client: &DcClient, id: &str) -> Result<Network> {
    client.get(&client.network_url(&format!("networks/{}", id))).await
}

pub async fn delete_network(client: &DcClient, id: &str) -> Result<Operation> {
    client.delete(&client.network_url(&format!("networks/{}", id))).await
}

/// List networks of a project
pub fn list_networks<'a>(client: &'a DcClient, project_id: &str) -> Pager<'a, Network> {
    Pager::new(client, client.network_url("networks"), "networks").param("projectId", project_id)
}

// =============================================================================
// Network connections
// =============================================================================

/// Connection lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[serde(rename = "NETWORK_CONNECTION_STATUS_CREATING")]
    #[default]
    Creating,
    #[serde(rename = "NETWORK_CONNECTION_STATUS_ACTIVE")]
    Active,
    #[serde(rename = "NETWORK_CONNECTION_STATUS_ERROR")]
    Error,
    #[serde(rename = "NETWORK_CONNECTION_STATUS_DELETING")]
    Deleting,
    #[serde(other)]
    Unknown,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Creating => "CREATING",
            ConnectionStatus::Active => "ACTIVE",
            ConnectionStatus::Error => "ERROR",
            ConnectionStatus::Deleting => "DELETING",
            ConnectionStatus::Unknown => "UNKNOWN",
        }
    }
}

/// AWS VPC peering parameters and results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AwsPeering {
    pub vpc_id: String,
    pub account_id: String,
    pub region_id: String,
    pub ipv4_cidr_block: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ipv6_cidr_block: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub peering_connection_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub managed_ipv4_cidr_block: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub managed_ipv6_cidr_block: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AwsConnection {
    pub peering: AwsPeering,
}

/// Google VPC peering parameters and results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleConnection {
    pub name: String,
    pub peer_network_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub managed_ipv4_cidr_block: String,
}

/// Connection type; exactly one variant is present on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionInfo {
    Aws(AwsConnection),
    Google(GoogleConnection),
}

/// Network connection as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConnection {
    pub id: String,
    pub network_id: String,
    pub description: String,
    pub connection_info: Option<ConnectionInfo>,
    pub status: ConnectionStatus,
    pub status_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNetworkConnectionRequest {
    pub network_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub connection_spec: ConnectionInfo,
}

pub async fn create_network_connection(
    client: &DcClient,
    request: &CreateNetworkConnectionRequest,
) -> Result<Operation> {
    client.post(&client.network_url("networkConnections"), request).await
}

pub async fn get_network_connection(client: &DcClient, id: &str) -> Result<NetworkConnection> {
    client
        .get(&client.network_url(&format!("networkConnections/{}", id)))
        .await
}

pub async fn delete_network_connection(client: &DcClient, id: &str) -> Result<Operation> {
    client
        .delete(&client.network_url(&format!("networkConnections/{}", id)))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connection_info_is_externally_tagged() {
        let conn: NetworkConnection = serde_json::from_value(json!({
            "id": "nc1",
            "networkId": "n1",
            "status": "NETWORK_CONNECTION_STATUS_ACTIVE",
            "connectionInfo": {
                "google": {"name": "peer", "peerNetworkUrl": "https://example/net", "managedIpv4CidrBlock": "10.1.0.0/16"}
            }
        }))
        .unwrap();
        assert_eq!(conn.status, ConnectionStatus::Active);
        match conn.connection_info {
            Some(ConnectionInfo::Google(g)) => assert_eq!(g.managed_ipv4_cidr_block, "10.1.0.0/16"),
            other => panic!("unexpected info: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_tolerated() {
        let conn: NetworkConnection =
            serde_json::from_value(json!({"id": "nc1", "status": "NETWORK_CONNECTION_STATUS_PAUSED"})).unwrap();
        assert_eq!(conn.status, ConnectionStatus::Unknown);
    }

    #[test]
    fn test_create_request_shape() {
        let request = CreateNetworkConnectionRequest {
            network_id: "n1".into(),
            description: String::new(),
            connection_spec: ConnectionInfo::Aws(AwsConnection {
                peering: AwsPeering {
                    vpc_id: "vpc-1".into(),
                    account_id: "123".into(),
                    region_id: "eu-west-1".into(),
                    ipv4_cidr_block: "10.0.0.0/16".into(),
                    ..Default::default()
                },
            }),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "networkId": "n1",
                "connectionSpec": {"aws": {"peering": {
                    "vpcId": "vpc-1", "accountId": "123", "regionId": "eu-west-1", "ipv4CidrBlock": "10.0.0.0/16"
                }}}
            })
        );
    }
}
