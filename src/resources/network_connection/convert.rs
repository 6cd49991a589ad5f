//! Model <-> API conversions for network connections

use super::model::{AwsModel, AwsPeeringModel, ConnectionSpecModel, GoogleModel, NetworkConnectionModel};
use crate::api::network::{
    AwsConnection, AwsPeering, ConnectionInfo, CreateNetworkConnectionRequest, GoogleConnection,
    NetworkConnection,
};
use crate::framework::{DiagResult, Diagnostic, Diagnostics};
use crate::resources::optional_string;

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl ConnectionSpecModel {
    /// Resolve the block into its single connection variant
    pub fn to_api(&self) -> DiagResult<ConnectionInfo> {
        match (&self.aws, &self.google) {
            (Some(aws), None) => {
                let peering = aws.peering.as_ref().ok_or_else(|| {
                    Diagnostics::from(
                        Diagnostic::error(
                            "Missing required block",
                            "aws connections need a peering block",
                        )
                        .at("connection_spec.aws.peering"),
                    )
                })?;
                Ok(ConnectionInfo::Aws(AwsConnection {
                    peering: AwsPeering {
                        vpc_id: text(&peering.vpc_id),
                        account_id: text(&peering.account_id),
                        region_id: text(&peering.region_id),
                        ipv4_cidr_block: text(&peering.ipv4_cidr_block),
                        ipv6_cidr_block: text(&peering.ipv6_cidr_block),
                        ..Default::default()
                    },
                }))
            }
            (None, Some(google)) => Ok(ConnectionInfo::Google(GoogleConnection {
                name: text(&google.name),
                peer_network_url: text(&google.peer_network_url),
                managed_ipv4_cidr_block: String::new(),
            })),
            (Some(_), Some(_)) => Err(one_of_error("only one of aws or google may be set")),
            (None, None) => Err(one_of_error("one of aws or google must be set")),
        }
    }

    pub fn apply_remote(&mut self, remote: &ConnectionInfo) {
        match remote {
            ConnectionInfo::Aws(aws) => {
                let prior = self
                    .aws
                    .take()
                    .and_then(|a| a.peering)
                    .unwrap_or_default();
                let p = &aws.peering;
                self.google = None;
                self.aws = Some(AwsModel {
                    peering: Some(AwsPeeringModel {
                        vpc_id: Some(p.vpc_id.clone()),
                        account_id: Some(p.account_id.clone()),
                        region_id: Some(p.region_id.clone()),
                        ipv4_cidr_block: Some(p.ipv4_cidr_block.clone()),
                        ipv6_cidr_block: optional_string(&prior.ipv6_cidr_block, &p.ipv6_cidr_block),
                        peering_connection_id: Some(p.peering_connection_id.clone()),
                        managed_ipv4_cidr_block: Some(p.managed_ipv4_cidr_block.clone()),
                        managed_ipv6_cidr_block: Some(p.managed_ipv6_cidr_block.clone()),
                    }),
                });
            }
            ConnectionInfo::Google(g) => {
                self.aws = None;
                self.google = Some(GoogleModel {
                    name: Some(g.name.clone()),
                    peer_network_url: Some(g.peer_network_url.clone()),
                    managed_ipv4_cidr_block: Some(g.managed_ipv4_cidr_block.clone()),
                });
            }
        }
    }
}

fn one_of_error(detail: &str) -> Diagnostics {
    Diagnostics::from(
        Diagnostic::error("Invalid connection_spec", detail).at("connection_spec"),
    )
}

impl NetworkConnectionModel {
    pub fn to_create_request(&self) -> DiagResult<CreateNetworkConnectionRequest> {
        let spec = self
            .connection_spec
            .as_ref()
            .ok_or_else(|| one_of_error("one of aws or google must be set"))?;
        Ok(CreateNetworkConnectionRequest {
            network_id: text(&self.network_id),
            description: text(&self.description),
            connection_spec: spec.to_api()?,
        })
    }

    pub fn apply_remote(&mut self, remote: &NetworkConnection) {
        self.id = Some(remote.id.clone());
        self.network_id = Some(remote.network_id.clone());
        self.description = optional_string(&self.description, &remote.description);
        if let Some(info) = &remote.connection_info {
            self.connection_spec
                .get_or_insert_with(ConnectionSpecModel::default)
                .apply_remote(info);
        }
        self.status = Some(remote.status.as_str().to_string());
        self.status_reason = Some(remote.status_reason.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::network::ConnectionStatus;

    fn google() -> GoogleModel {
        GoogleModel {
            name: Some("peer".into()),
            peer_network_url: Some("https://www.googleapis.com/compute/v1/projects/p/global/networks/n".into()),
            managed_ipv4_cidr_block: None,
        }
    }

    #[test]
    fn test_both_variants_rejected() {
        let spec = ConnectionSpecModel {
            aws: Some(AwsModel::default()),
            google: Some(google()),
        };
        let err = spec.to_api().unwrap_err();
        assert!(err.to_string().contains("only one of aws or google"));
    }

    #[test]
    fn test_neither_variant_rejected() {
        let err = ConnectionSpecModel::default().to_api().unwrap_err();
        assert!(err.to_string().contains("one of aws or google must be set"));
    }

    #[test]
    fn test_aws_requires_peering() {
        let spec = ConnectionSpecModel {
            aws: Some(AwsModel { peering: None }),
            google: None,
        };
        assert!(spec.to_api().is_err());
    }

    #[test]
    fn test_google_round_trip() {
        let mut model = NetworkConnectionModel {
            network_id: Some("n1".into()),
            connection_spec: Some(ConnectionSpecModel {
                aws: None,
                google: Some(google()),
            }),
            ..Default::default()
        };
        let request = model.to_create_request().unwrap();
        let ConnectionInfo::Google(mut g) = request.connection_spec else {
            panic!("expected google connection");
        };
        g.managed_ipv4_cidr_block = "10.20.0.0/16".into();

        model.apply_remote(&NetworkConnection {
            id: "nc1".into(),
            network_id: "n1".into(),
            connection_info: Some(ConnectionInfo::Google(g)),
            status: ConnectionStatus::Creating,
            ..Default::default()
        });
        let spec = model.connection_spec.unwrap().google.unwrap();
        assert_eq!(spec.name, google().name);
        assert_eq!(spec.peer_network_url, google().peer_network_url);
        assert_eq!(spec.managed_ipv4_cidr_block.as_deref(), Some("10.20.0.0/16"));
        assert_eq!(model.status.as_deref(), Some("CREATING"));
    }
}
