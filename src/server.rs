//! Plugin host protocol
//!
//! One JSON request per line on the input, one JSON response per line on the
//! output. Requests are handled in order; lifecycle calls run under a child of
//! the root [`OpContext`], so cancelling the root stops any wait in progress.
//! Input is still read while a call runs, and a `Stop` line cancels the root
//! right away.

use crate::context::OpContext;
use crate::framework::{parse_duration, DataSource, DiagResult, Diagnostic, Diagnostics, Resource};
use crate::provider::{ConfiguredProvider, Provider};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "method")]
pub enum Request {
    GetProviderSchema,
    ConfigureProvider {
        #[serde(default)]
        config: Value,
    },
    ValidateResourceConfig {
        type_name: String,
        config: Value,
    },
    /// `proposed_state` is the configuration; `prior_state` is absent or null on create
    PlanResourceChange {
        type_name: String,
        #[serde(default)]
        prior_state: Value,
        proposed_state: Value,
    },
    CreateResource {
        type_name: String,
        planned_state: Value,
        #[serde(default)]
        timeout: Option<String>,
    },
    ReadResource {
        type_name: String,
        current_state: Value,
    },
    UpdateResource {
        type_name: String,
        prior_state: Value,
        planned_state: Value,
        #[serde(default)]
        timeout: Option<String>,
    },
    DeleteResource {
        type_name: String,
        current_state: Value,
        #[serde(default)]
        timeout: Option<String>,
    },
    ImportResourceState {
        type_name: String,
        id: String,
    },
    ReadDataSource {
        type_name: String,
        config: Value,
    },
    Stop,
}

impl Request {
    fn method(&self) -> &'static str {
        match self {
            Request::GetProviderSchema => "GetProviderSchema",
            Request::ConfigureProvider { .. } => "ConfigureProvider",
            Request::ValidateResourceConfig { .. } => "ValidateResourceConfig",
            Request::PlanResourceChange { .. } => "PlanResourceChange",
            Request::CreateResource { .. } => "CreateResource",
            Request::ReadResource { .. } => "ReadResource",
            Request::UpdateResource { .. } => "UpdateResource",
            Request::DeleteResource { .. } => "DeleteResource",
            Request::ImportResourceState { .. } => "ImportResourceState",
            Request::ReadDataSource { .. } => "ReadDataSource",
            Request::Stop => "Stop",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub result: Value,
    pub diagnostics: Diagnostics,
}

impl From<DiagResult<Value>> for Response {
    fn from(outcome: DiagResult<Value>) -> Self {
        match outcome {
            Ok(result) => Self {
                result,
                diagnostics: Diagnostics::new(),
            },
            Err(mut diagnostics) => Self {
                result: diagnostics.take_partial_state().unwrap_or(Value::Null),
                diagnostics,
            },
        }
    }
}

pub struct Server {
    provider: Provider,
    configured: Option<ConfiguredProvider>,
    root: OpContext,
}

impl Server {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            configured: None,
            root: OpContext::background(),
        }
    }

    /// Start with an already configured provider
    pub fn with_configured(provider: Provider, configured: ConfiguredProvider) -> Self {
        Self {
            provider,
            configured: Some(configured),
            root: OpContext::background(),
        }
    }

    /// Handle to the root context; cancelling it interrupts every call
    pub fn root_context(&self) -> OpContext {
        self.root.clone()
    }

    fn configured(&self) -> DiagResult<&ConfiguredProvider> {
        self.configured.as_ref().ok_or_else(|| {
            Diagnostics::error(
                "Provider not configured",
                "ConfigureProvider must succeed before resources or data sources are used",
            )
        })
    }

    fn op_context(&self, timeout: &Option<String>) -> DiagResult<OpContext> {
        match timeout.as_deref().filter(|t| !t.is_empty()) {
            None => Ok(self.root.child()),
            Some(raw) => parse_duration(raw)
                .map(|timeout| self.root.with_timeout(timeout))
                .map_err(|e| Diagnostic::error("Invalid timeout", e.to_string()).at("timeout").into()),
        }
    }

    pub async fn handle(&mut self, request: Request) -> Response {
        let method = request.method();
        tracing::debug!("Handling {}", method);
        let mut warnings = Diagnostics::new();
        let mut response: Response = self.dispatch(request, &mut warnings).await.into();
        response.diagnostics.extend(warnings);
        if response.diagnostics.has_errors() {
            tracing::warn!("{} finished with {} diagnostics", method, response.diagnostics.len());
        }
        response
    }

    async fn dispatch(&mut self, request: Request, warnings: &mut Diagnostics) -> DiagResult<Value> {
        match request {
            Request::GetProviderSchema => self.provider.schema_document(),
            Request::ConfigureProvider { config } => {
                let configured = self.provider.configure(config)?;
                self.configured = Some(configured);
                Ok(Value::Null)
            }
            Request::ValidateResourceConfig { type_name, config } => {
                let resource = self.configured()?.resource(&type_name)?;
                checked(validate(&*resource, &config), warnings)?;
                Ok(Value::Null)
            }
            Request::PlanResourceChange {
                type_name,
                prior_state,
                proposed_state,
            } => {
                let resource = self.configured()?.resource(&type_name)?;
                if proposed_state.is_null() {
                    return Ok(json!({"planned_state": null, "requires_replace": []}));
                }
                checked(validate(&*resource, &proposed_state), warnings)?;
                let prior = Some(&prior_state).filter(|p| !p.is_null());
                let plan = resource.schema().plan(prior, &proposed_state);
                serde_json::to_value(plan)
                    .map_err(|e| Diagnostics::error("Failed to encode plan", e.to_string()))
            }
            Request::CreateResource {
                type_name,
                planned_state,
                timeout,
            } => {
                let resource = self.configured()?.resource(&type_name)?;
                let ctx = self.op_context(&timeout)?;
                tracing::debug!("Creating {}: {}", type_name, resource.schema().redact(&planned_state));
                resource.create(&ctx, planned_state).await
            }
            Request::ReadResource {
                type_name,
                current_state,
            } => {
                let resource = self.configured()?.resource(&type_name)?;
                resource.read(&self.root.child(), current_state).await
            }
            Request::UpdateResource {
                type_name,
                prior_state,
                planned_state,
                timeout,
            } => {
                let resource = self.configured()?.resource(&type_name)?;
                let ctx = self.op_context(&timeout)?;
                tracing::debug!("Updating {}: {}", type_name, resource.schema().redact(&planned_state));
                resource.update(&ctx, prior_state, planned_state).await
            }
            Request::DeleteResource {
                type_name,
                current_state,
                timeout,
            } => {
                let resource = self.configured()?.resource(&type_name)?;
                let ctx = self.op_context(&timeout)?;
                resource.delete(&ctx, current_state).await?;
                Ok(Value::Null)
            }
            Request::ImportResourceState { type_name, id } => {
                let resource = self.configured()?.resource(&type_name)?;
                resource.import_state(&self.root.child(), &id).await
            }
            Request::ReadDataSource { type_name, config } => {
                let data_source = self.configured()?.data_source(&type_name)?;
                checked(data_source.schema().validate(&config), warnings)?;
                data_source.read(&self.root.child(), config).await
            }
            Request::Stop => {
                tracing::info!("Stop requested");
                self.root.cancel();
                Ok(Value::Null)
            }
        }
    }

    /// Serve requests until the input closes, `Stop` arrives or the root
    /// context is cancelled.
    pub async fn serve<R, W>(mut self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut pending: VecDeque<String> = VecDeque::new();
        let mut input_closed = false;
        let root = self.root.clone();

        loop {
            let line = match pending.pop_front() {
                Some(line) => Some(line),
                None if input_closed => None,
                None => tokio::select! {
                    biased;
                    _ = root.done() => {
                        tracing::info!("Provider cancelled, shutting down");
                        break;
                    }
                    line = lines.next_line() => line.context("Failed to read request")?,
                },
            };
            let Some(line) = line else {
                tracing::info!("Input closed, shutting down");
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let (response, stop) = match serde_json::from_str::<Request>(&line) {
                Ok(request) => {
                    let stop = request == Request::Stop;
                    let handling = self.handle(request);
                    tokio::pin!(handling);

                    // Keep reading while the call runs so a Stop can interrupt it
                    let response = loop {
                        tokio::select! {
                            biased;
                            response = &mut handling => break response,
                            line = lines.next_line(), if !input_closed => {
                                match line.context("Failed to read request")? {
                                    Some(line) => {
                                        if is_stop(&line) {
                                            tracing::info!("Stop received, cancelling the call in progress");
                                            root.cancel();
                                        }
                                        pending.push_back(line);
                                    }
                                    None => input_closed = true,
                                }
                            }
                        }
                    };
                    (response, stop)
                }
                Err(e) => (
                    Response {
                        result: Value::Null,
                        diagnostics: Diagnostics::error("Malformed request", e.to_string()),
                    },
                    false,
                ),
            };

            let mut encoded = serde_json::to_vec(&response).context("Failed to encode response")?;
            encoded.push(b'\n');
            output.write_all(&encoded).await.context("Failed to write response")?;
            output.flush().await.context("Failed to flush response")?;

            if stop {
                break;
            }
        }
        Ok(())
    }
}

fn is_stop(line: &str) -> bool {
    matches!(serde_json::from_str::<Request>(line), Ok(Request::Stop))
}

/// Errors fail the call; warnings ride along with its result
fn checked(diags: Diagnostics, warnings: &mut Diagnostics) -> DiagResult<()> {
    if diags.has_errors() {
        return Err(diags);
    }
    warnings.extend(diags);
    Ok(())
}

/// Schema checks first; handler checks only on a structurally valid config
fn validate(resource: &dyn Resource, config: &Value) -> Diagnostics {
    let mut diags = resource.schema().validate(config);
    if !diags.has_errors() {
        diags.extend(resource.validate_config(config));
    }
    diags
}
