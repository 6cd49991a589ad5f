//! Model <-> API conversions for transfer endpoints
//!
//! Every "one of" block is resolved into the matching API enum here; all
//! problems found while converting are collected before any request is sent.
//! Secrets are never returned by the API, so reading keeps the prior values.

use super::model::*;
use crate::api::transfer::{
    ClickhouseConnection, ClickhouseOnPremise, ClickhouseSource, ClickhouseTarget,
    CreateEndpointRequest, CsvFormat, DbConnection, Endpoint, EndpointSettings, JsonlFormat,
    KafkaAuth, KafkaConnection, KafkaSource, MysqlSource, OnPremise, ParquetFormat,
    PostgresSource, PostgresTarget, S3Format, S3Provider, S3Source, Secret, UpdateEndpointRequest,
};
use crate::framework::{DiagResult, Diagnostic, Diagnostics};
use crate::resources::optional_string;

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn secret(value: &Option<String>) -> Option<Secret> {
    Secret::new(value.as_deref().unwrap_or_default())
}

fn strings(value: &Option<Vec<String>>) -> Vec<String> {
    value.clone().unwrap_or_default()
}

fn list(prior: &Option<Vec<String>>, remote: &[String]) -> Option<Vec<String>> {
    if remote.is_empty() && prior.is_none() {
        None
    } else {
        Some(remote.to_vec())
    }
}

fn flag(prior: &Option<bool>, remote: bool) -> Option<bool> {
    if !remote && prior.is_none() {
        None
    } else {
        Some(remote)
    }
}

/// Record an error unless exactly one of `present` is set
fn exactly_one(path: &str, present: &[(&str, bool)], diags: &mut Diagnostics) {
    let set: Vec<&str> = present.iter().filter(|(_, on)| *on).map(|(n, _)| *n).collect();
    let names: Vec<&str> = present.iter().map(|(n, _)| *n).collect();
    match set.len() {
        1 => {}
        0 => diags.add_attribute_error(
            path,
            "Invalid block",
            format!("one of {} must be set", names.join(", ")),
        ),
        _ => diags.add_attribute_error(
            path,
            "Invalid block",
            format!("only one of {} may be set, got {}", names.join(", "), set.join(", ")),
        ),
    }
}

// =============================================================================
// Model -> API
// =============================================================================

fn db_connection(model: &Option<DbConnectionModel>) -> DbConnection {
    let on_premise = model
        .as_ref()
        .and_then(|c| c.on_premise.clone())
        .unwrap_or_default();
    DbConnection {
        on_premise: OnPremise {
            hosts: strings(&on_premise.hosts),
            port: on_premise.port.unwrap_or_default(),
            ca_certificate: text(&on_premise.ca_certificate),
        },
    }
}

fn clickhouse_connection(
    path: &str,
    model: &Option<ClickhouseConnectionModel>,
    diags: &mut Diagnostics,
) -> ClickhouseConnection {
    let model = model.clone().unwrap_or_default();
    let cluster_id = model.cluster_id.filter(|id| !id.is_empty());
    exactly_one(
        path,
        &[("cluster_id", cluster_id.is_some()), ("on_premise", model.on_premise.is_some())],
        diags,
    );
    ClickhouseConnection {
        cluster_id: cluster_id.unwrap_or_default(),
        on_premise: model.on_premise.map(|op| ClickhouseOnPremise {
            hosts: strings(&op.hosts),
            http_port: op.http_port.unwrap_or(8443),
            native_port: op.native_port.unwrap_or(9440),
            ca_certificate: text(&op.ca_certificate),
        }),
    }
}

fn kafka_source(path: &str, model: &KafkaSourceModel, diags: &mut Diagnostics) -> KafkaSource {
    let connection = model.connection.clone().unwrap_or_default();
    let cluster_id = connection.cluster_id.filter(|id| !id.is_empty());
    exactly_one(
        &format!("{}.connection", path),
        &[
            ("cluster_id", cluster_id.is_some()),
            ("broker_urls", connection.broker_urls.is_some()),
        ],
        diags,
    );

    let auth_model = model.auth.clone().unwrap_or_default();
    exactly_one(
        &format!("{}.auth", path),
        &[("sasl", auth_model.sasl.is_some()), ("no_auth", auth_model.no_auth.is_some())],
        diags,
    );
    let auth = match auth_model.sasl {
        Some(sasl) => KafkaAuth::Sasl {
            user: text(&sasl.user),
            password: secret(&sasl.password),
            mechanism: text(&sasl.mechanism),
        },
        None => KafkaAuth::NoAuth {},
    };

    KafkaSource {
        connection: KafkaConnection {
            cluster_id: cluster_id.unwrap_or_default(),
            broker_urls: strings(&connection.broker_urls),
        },
        auth,
        topic_name: text(&model.topic_name),
    }
}

fn s3_format(path: &str, model: &Option<S3FormatModel>, diags: &mut Diagnostics) -> S3Format {
    let model = model.clone().unwrap_or_default();
    exactly_one(
        path,
        &[
            ("csv", model.csv.is_some()),
            ("parquet", model.parquet.is_some()),
            ("avro", model.avro.is_some()),
            ("jsonl", model.jsonl.is_some()),
        ],
        diags,
    );

    if let Some(csv) = model.csv {
        S3Format::Csv(CsvFormat {
            delimiter: csv.delimiter.unwrap_or_else(|| ",".to_string()),
            quote_char: text(&csv.quote_char),
            escape_char: text(&csv.escape_char),
            encoding: text(&csv.encoding),
            double_quote: csv.double_quote.unwrap_or(true),
            newlines_in_values: csv.newlines_in_values.unwrap_or(false),
            block_size: csv.block_size,
        })
    } else if let Some(parquet) = model.parquet {
        S3Format::Parquet(ParquetFormat {
            buffer_size: parquet.buffer_size,
            columns: strings(&parquet.columns),
        })
    } else if let Some(jsonl) = model.jsonl {
        S3Format::Jsonl(JsonlFormat {
            newlines_in_values: jsonl.newlines_in_values.unwrap_or(false),
            unexpected_field_behavior: text(&jsonl.unexpected_field_behavior),
            block_size: jsonl.block_size,
        })
    } else {
        S3Format::Avro {}
    }
}

fn s3_source(path: &str, model: &S3SourceModel, diags: &mut Diagnostics) -> S3Source {
    let provider = model.provider.clone().unwrap_or_default();
    S3Source {
        dataset: text(&model.dataset),
        path_pattern: text(&model.path_pattern),
        schema: text(&model.schema),
        format: s3_format(&format!("{}.format", path), &model.format, diags),
        provider: S3Provider {
            bucket: text(&provider.bucket),
            aws_access_key_id: text(&provider.aws_access_key_id),
            aws_secret_access_key: secret(&provider.aws_secret_access_key),
            endpoint: text(&provider.endpoint),
            region: text(&provider.region),
        },
    }
}

impl SettingsModel {
    /// Resolve the settings block into its single endpoint kind
    pub fn to_api(&self) -> DiagResult<EndpointSettings> {
        let mut diags = Diagnostics::new();
        exactly_one(
            "settings",
            &[
                ("postgres_source", self.postgres_source.is_some()),
                ("postgres_target", self.postgres_target.is_some()),
                ("mysql_source", self.mysql_source.is_some()),
                ("clickhouse_source", self.clickhouse_source.is_some()),
                ("clickhouse_target", self.clickhouse_target.is_some()),
                ("kafka_source", self.kafka_source.is_some()),
                ("s3_source", self.s3_source.is_some()),
            ],
            &mut diags,
        );
        if diags.has_errors() {
            return Err(diags);
        }

        let settings = if let Some(m) = &self.postgres_source {
            EndpointSettings::PostgresSource(PostgresSource {
                connection: db_connection(&m.connection),
                database: text(&m.database),
                user: text(&m.user),
                password: secret(&m.password),
                include_tables: strings(&m.include_tables),
                exclude_tables: strings(&m.exclude_tables),
                service_schema: text(&m.service_schema),
                slot_byte_lag_limit: m.slot_byte_lag_limit,
            })
        } else if let Some(m) = &self.postgres_target {
            EndpointSettings::PostgresTarget(PostgresTarget {
                connection: db_connection(&m.connection),
                database: text(&m.database),
                user: text(&m.user),
                password: secret(&m.password),
                cleanup_policy: text(&m.cleanup_policy),
            })
        } else if let Some(m) = &self.mysql_source {
            EndpointSettings::MysqlSource(MysqlSource {
                connection: db_connection(&m.connection),
                database: text(&m.database),
                user: text(&m.user),
                password: secret(&m.password),
                include_tables_regex: strings(&m.include_tables_regex),
                exclude_tables_regex: strings(&m.exclude_tables_regex),
                timezone: text(&m.timezone),
            })
        } else if let Some(m) = &self.clickhouse_source {
            EndpointSettings::ClickhouseSource(ClickhouseSource {
                connection: clickhouse_connection(
                    "settings.clickhouse_source.connection",
                    &m.connection,
                    &mut diags,
                ),
                database: text(&m.database),
                user: text(&m.user),
                password: secret(&m.password),
                include_tables: strings(&m.include_tables),
                exclude_tables: strings(&m.exclude_tables),
            })
        } else if let Some(m) = &self.clickhouse_target {
            EndpointSettings::ClickhouseTarget(ClickhouseTarget {
                connection: clickhouse_connection(
                    "settings.clickhouse_target.connection",
                    &m.connection,
                    &mut diags,
                ),
                database: text(&m.database),
                user: text(&m.user),
                password: secret(&m.password),
                clickhouse_cluster_name: text(&m.clickhouse_cluster_name),
                cleanup_policy: text(&m.cleanup_policy),
            })
        } else if let Some(m) = &self.kafka_source {
            EndpointSettings::KafkaSource(kafka_source("settings.kafka_source", m, &mut diags))
        } else {
            let m = self.s3_source.clone().unwrap_or_default();
            EndpointSettings::S3Source(s3_source("settings.s3_source", &m, &mut diags))
        };

        diags.into_result()?;
        Ok(settings)
    }
}

// =============================================================================
// API -> model
// =============================================================================

fn db_connection_from(prior: &Option<DbConnectionModel>, remote: &DbConnection) -> Option<DbConnectionModel> {
    let prior = prior.clone().unwrap_or_default().on_premise.unwrap_or_default();
    let op = &remote.on_premise;
    Some(DbConnectionModel {
        on_premise: Some(OnPremiseModel {
            hosts: Some(op.hosts.clone()),
            port: Some(op.port),
            ca_certificate: optional_string(&prior.ca_certificate, &op.ca_certificate),
        }),
    })
}

fn clickhouse_connection_from(
    prior: &Option<ClickhouseConnectionModel>,
    remote: &ClickhouseConnection,
) -> Option<ClickhouseConnectionModel> {
    let prior = prior.clone().unwrap_or_default();
    Some(ClickhouseConnectionModel {
        cluster_id: optional_string(&prior.cluster_id, &remote.cluster_id),
        on_premise: remote.on_premise.as_ref().map(|op| {
            let p = prior.on_premise.clone().unwrap_or_default();
            ClickhouseOnPremiseModel {
                hosts: Some(op.hosts.clone()),
                http_port: Some(op.http_port),
                native_port: Some(op.native_port),
                ca_certificate: optional_string(&p.ca_certificate, &op.ca_certificate),
            }
        }),
    })
}

fn kafka_source_from(prior: Option<&KafkaSourceModel>, remote: &KafkaSource) -> KafkaSourceModel {
    let prior = prior.cloned().unwrap_or_default();
    let prior_conn = prior.connection.clone().unwrap_or_default();
    let prior_auth = prior.auth.clone().unwrap_or_default();
    KafkaSourceModel {
        connection: Some(KafkaConnectionModel {
            cluster_id: optional_string(&prior_conn.cluster_id, &remote.connection.cluster_id),
            broker_urls: list(&prior_conn.broker_urls, &remote.connection.broker_urls),
        }),
        auth: Some(match &remote.auth {
            KafkaAuth::Sasl { user, mechanism, .. } => {
                let prior_sasl = prior_auth.sasl.unwrap_or_default();
                KafkaAuthModel {
                    sasl: Some(SaslModel {
                        user: Some(user.clone()),
                        password: prior_sasl.password,
                        mechanism: optional_string(&prior_sasl.mechanism, mechanism),
                    }),
                    no_auth: None,
                }
            }
            KafkaAuth::NoAuth {} => KafkaAuthModel {
                sasl: None,
                no_auth: Some(EmptyModel {}),
            },
        }),
        topic_name: optional_string(&prior.topic_name, &remote.topic_name),
    }
}

fn s3_format_from(prior: &Option<S3FormatModel>, remote: &S3Format) -> S3FormatModel {
    let prior = prior.clone().unwrap_or_default();
    match remote {
        S3Format::Csv(csv) => {
            let p = prior.csv.unwrap_or_default();
            S3FormatModel {
                csv: Some(CsvModel {
                    delimiter: optional_string(&p.delimiter, &csv.delimiter),
                    quote_char: optional_string(&p.quote_char, &csv.quote_char),
                    escape_char: optional_string(&p.escape_char, &csv.escape_char),
                    encoding: optional_string(&p.encoding, &csv.encoding),
                    double_quote: p.double_quote.map(|_| csv.double_quote),
                    newlines_in_values: flag(&p.newlines_in_values, csv.newlines_in_values),
                    block_size: p.block_size.and(csv.block_size),
                }),
                ..Default::default()
            }
        }
        S3Format::Parquet(parquet) => {
            let p = prior.parquet.unwrap_or_default();
            S3FormatModel {
                parquet: Some(ParquetModel {
                    buffer_size: p.buffer_size.and(parquet.buffer_size),
                    columns: list(&p.columns, &parquet.columns),
                }),
                ..Default::default()
            }
        }
        S3Format::Avro {} => S3FormatModel {
            avro: Some(EmptyModel {}),
            ..Default::default()
        },
        S3Format::Jsonl(jsonl) => {
            let p = prior.jsonl.unwrap_or_default();
            S3FormatModel {
                jsonl: Some(JsonlModel {
                    newlines_in_values: flag(&p.newlines_in_values, jsonl.newlines_in_values),
                    unexpected_field_behavior: optional_string(
                        &p.unexpected_field_behavior,
                        &jsonl.unexpected_field_behavior,
                    ),
                    block_size: p.block_size.and(jsonl.block_size),
                }),
                ..Default::default()
            }
        }
    }
}

fn s3_source_from(prior: Option<&S3SourceModel>, remote: &S3Source) -> S3SourceModel {
    let prior = prior.cloned().unwrap_or_default();
    let p = prior.provider.clone().unwrap_or_default();
    S3SourceModel {
        dataset: Some(remote.dataset.clone()),
        path_pattern: Some(remote.path_pattern.clone()),
        schema: optional_string(&prior.schema, &remote.schema),
        format: Some(s3_format_from(&prior.format, &remote.format)),
        provider: Some(S3ProviderModel {
            bucket: Some(remote.provider.bucket.clone()),
            aws_access_key_id: optional_string(&p.aws_access_key_id, &remote.provider.aws_access_key_id),
            aws_secret_access_key: p.aws_secret_access_key,
            endpoint: optional_string(&p.endpoint, &remote.provider.endpoint),
            region: optional_string(&p.region, &remote.provider.region),
        }),
    }
}

impl SettingsModel {
    /// Settings as reported remotely, carrying secrets over from `prior`
    pub fn from_api(prior: Option<&SettingsModel>, remote: &EndpointSettings) -> Self {
        let empty = SettingsModel::default();
        let prior = prior.unwrap_or(&empty);
        let mut out = SettingsModel::default();
        match remote {
            EndpointSettings::PostgresSource(r) => {
                let p = prior.postgres_source.clone().unwrap_or_default();
                out.postgres_source = Some(PostgresSourceModel {
                    connection: db_connection_from(&p.connection, &r.connection),
                    database: Some(r.database.clone()),
                    user: Some(r.user.clone()),
                    password: p.password,
                    include_tables: list(&p.include_tables, &r.include_tables),
                    exclude_tables: list(&p.exclude_tables, &r.exclude_tables),
                    service_schema: optional_string(&p.service_schema, &r.service_schema),
                    slot_byte_lag_limit: p.slot_byte_lag_limit.and(r.slot_byte_lag_limit),
                });
            }
            EndpointSettings::PostgresTarget(r) => {
                let p = prior.postgres_target.clone().unwrap_or_default();
                out.postgres_target = Some(PostgresTargetModel {
                    connection: db_connection_from(&p.connection, &r.connection),
                    database: Some(r.database.clone()),
                    user: Some(r.user.clone()),
                    password: p.password,
                    cleanup_policy: optional_string(&p.cleanup_policy, &r.cleanup_policy),
                });
            }
            EndpointSettings::MysqlSource(r) => {
                let p = prior.mysql_source.clone().unwrap_or_default();
                out.mysql_source = Some(MysqlSourceModel {
                    connection: db_connection_from(&p.connection, &r.connection),
                    database: Some(r.database.clone()),
                    user: Some(r.user.clone()),
                    password: p.password,
                    include_tables_regex: list(&p.include_tables_regex, &r.include_tables_regex),
                    exclude_tables_regex: list(&p.exclude_tables_regex, &r.exclude_tables_regex),
                    timezone: optional_string(&p.timezone, &r.timezone),
                });
            }
            EndpointSettings::ClickhouseSource(r) => {
                let p = prior.clickhouse_source.clone().unwrap_or_default();
                out.clickhouse_source = Some(ClickhouseSourceModel {
                    connection: clickhouse_connection_from(&p.connection, &r.connection),
                    database: Some(r.database.clone()),
                    user: Some(r.user.clone()),
                    password: p.password,
                    include_tables: list(&p.include_tables, &r.include_tables),
                    exclude_tables: list(&p.exclude_tables, &r.exclude_tables),
                });
            }
            EndpointSettings::ClickhouseTarget(r) => {
                let p = prior.clickhouse_target.clone().unwrap_or_default();
                out.clickhouse_target = Some(ClickhouseTargetModel {
                    connection: clickhouse_connection_from(&p.connection, &r.connection),
                    database: Some(r.database.clone()),
                    user: Some(r.user.clone()),
                    password: p.password,
                    clickhouse_cluster_name: optional_string(
                        &p.clickhouse_cluster_name,
                        &r.clickhouse_cluster_name,
                    ),
                    cleanup_policy: optional_string(&p.cleanup_policy, &r.cleanup_policy),
                });
            }
            EndpointSettings::KafkaSource(r) => {
                out.kafka_source = Some(kafka_source_from(prior.kafka_source.as_ref(), r));
            }
            EndpointSettings::S3Source(r) => {
                out.s3_source = Some(s3_source_from(prior.s3_source.as_ref(), r));
            }
        }
        out
    }
}

impl TransferEndpointModel {
    fn settings_to_api(&self) -> DiagResult<EndpointSettings> {
        match &self.settings {
            Some(settings) => settings.to_api(),
            None => Err(Diagnostics::from(
                Diagnostic::error("Missing required block", "a settings block is required").at("settings"),
            )),
        }
    }

    pub fn to_create_request(&self) -> DiagResult<CreateEndpointRequest> {
        Ok(CreateEndpointRequest {
            project_id: text(&self.project_id),
            name: text(&self.name),
            description: text(&self.description),
            settings: self.settings_to_api()?,
        })
    }

    pub fn to_update_request(&self) -> DiagResult<UpdateEndpointRequest> {
        Ok(UpdateEndpointRequest {
            name: text(&self.name),
            description: text(&self.description),
            settings: self.settings_to_api()?,
        })
    }

    pub fn apply_remote(&mut self, remote: &Endpoint) {
        self.id = Some(remote.id.clone());
        self.project_id = Some(remote.project_id.clone());
        self.name = Some(remote.name.clone());
        self.description = optional_string(&self.description, &remote.description);
        if let Some(settings) = &remote.settings {
            self.settings = Some(SettingsModel::from_api(self.settings.as_ref(), settings));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postgres_source() -> PostgresSourceModel {
        PostgresSourceModel {
            connection: Some(DbConnectionModel {
                on_premise: Some(OnPremiseModel {
                    hosts: Some(vec!["pg.internal".into()]),
                    port: Some(5432),
                    ca_certificate: None,
                }),
            }),
            database: Some("app".into()),
            user: Some("replicator".into()),
            password: Some("hunter2".into()),
            include_tables: Some(vec!["public.orders".into()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_settings_variant_rejected() {
        let err = SettingsModel::default().to_api().unwrap_err();
        assert!(err.to_string().contains("settings: Invalid block: one of postgres_source"));
    }

    #[test]
    fn test_two_settings_variants_rejected() {
        let settings = SettingsModel {
            postgres_source: Some(postgres_source()),
            s3_source: Some(S3SourceModel::default()),
            ..Default::default()
        };
        let err = settings.to_api().unwrap_err();
        assert!(err.to_string().contains("got postgres_source, s3_source"));
    }

    #[test]
    fn test_s3_format_one_of() {
        let settings = SettingsModel {
            s3_source: Some(S3SourceModel {
                dataset: Some("events".into()),
                format: Some(S3FormatModel {
                    csv: Some(CsvModel::default()),
                    parquet: Some(ParquetModel::default()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = settings.to_api().unwrap_err();
        assert!(err.to_string().contains("settings.s3_source.format"));

        let settings = SettingsModel {
            s3_source: Some(S3SourceModel {
                format: Some(S3FormatModel {
                    avro: Some(EmptyModel {}),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let EndpointSettings::S3Source(source) = settings.to_api().unwrap() else {
            panic!("expected s3 source");
        };
        assert_eq!(source.format, S3Format::Avro {});
    }

    #[test]
    fn test_kafka_auth_and_connection_errors_collected() {
        let settings = SettingsModel {
            kafka_source: Some(KafkaSourceModel {
                connection: Some(KafkaConnectionModel {
                    cluster_id: Some("k1".into()),
                    broker_urls: Some(vec!["b:9092".into()]),
                }),
                auth: None,
                topic_name: Some("events".into()),
            }),
            ..Default::default()
        };
        let err = settings.to_api().unwrap_err();
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn test_password_survives_read() {
        let mut model = TransferEndpointModel {
            project_id: Some("p1".into()),
            name: Some("pg".into()),
            settings: Some(SettingsModel {
                postgres_source: Some(postgres_source()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let submitted = model.clone();
        let mut remote_settings = model.to_create_request().unwrap().settings;
        if let EndpointSettings::PostgresSource(pg) = &mut remote_settings {
            pg.password = None;
        }

        model.apply_remote(&Endpoint {
            id: "e1".into(),
            project_id: "p1".into(),
            name: "pg".into(),
            description: String::new(),
            settings: Some(remote_settings),
        });
        assert_eq!(model.settings, submitted.settings);
        assert_eq!(model.id.as_deref(), Some("e1"));
    }
}
