//! The fluent query builder.
//!
//! [`AhrefsClient`] owns the query under construction, the prepared batch
//! and the executor. Builder calls mutate the query and return the client;
//! a terminal call validates it, resets the builder, then either executes
//! the query (`get`) or stashes it for the next [`AhrefsClient::run`]
//! (`prepare`).
//!
//! ```no_run
//! use ahrefs_api::AhrefsClient;
//!
//! # fn main() -> ahrefs_api::Result<()> {
//! let mut client = AhrefsClient::builder("token").build()?;
//! let body = client
//!     .set_target("ahrefs.com")?
//!     .mode_domain()?
//!     .select(["url", "ahrefs_rank"])?
//!     .set_limit(10)?
//!     .get("ahrefs_rank")?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use ahrefs_http::{RequestDiagnostic, Transport, UreqTransport};
use ahrefs_schema::Schema;
use tracing::{debug, warn};

use crate::{
    config::ClientConfig,
    dispatch::{Call, Command, Verb},
    error::{ApiError, Result},
    executor::{merge_original_stats, Executor},
    expr::Clause,
    query::{check_required, BatchResults, PreparedBatch, QueryParams, QueryState, Validator},
    value::Value,
};

/// `params` names the client consumes itself instead of sending.
const POST_OPTION: &str = "post";
const ORIGINAL_STATS_OPTION: &str = "withOriginalStats";

/// What a dispatched call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The builder was updated; keep chaining.
    Continue,
    /// A `get` call ran and returned this body.
    Fetched(String),
}

impl Dispatch {
    pub fn into_body(self) -> Option<String> {
        match self {
            Dispatch::Continue => None,
            Dispatch::Fetched(body) => Some(body),
        }
    }
}

pub struct ClientBuilder {
    config: ClientConfig,
    schema: Option<Arc<Schema>>,
    transport: Option<Box<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            schema: None,
            transport: None,
        }
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.config.api_url = api_url.into();
        self
    }

    /// Turns schema checking of calls and queries on or off.
    pub fn checking(mut self, checking: bool) -> Self {
        self.config.checking = checking;
        self
    }

    /// Uses `schema` instead of the configured or bundled one.
    pub fn schema(mut self, schema: Arc<Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Uses `transport` instead of the ureq transport.
    pub fn transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<AhrefsClient> {
        self.config.validate()?;

        let schema = match (self.schema, &self.config.schema_path) {
            (Some(schema), _) => schema,
            (None, Some(path)) => Arc::new(Schema::from_file(path)?),
            (None, None) => ahrefs_schema::builtin(),
        };
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(UreqTransport::new(self.config.transport_options())?),
        };

        debug!(
            api_url = self.config.api_url.as_str(),
            checking = self.config.checking,
            "client ready"
        );

        Ok(AhrefsClient {
            executor: Executor::new(&self.config.api_url, &self.config.token, transport),
            config: self.config,
            schema,
            state: QueryState::new(),
            batch: PreparedBatch::new(),
            post: None,
            with_original_stats: false,
        })
    }
}

/// A query builder bound to one API token.
///
/// Not meant to be shared between threads; each logical caller should own
/// its own client.
pub struct AhrefsClient {
    config: ClientConfig,
    schema: Arc<Schema>,
    state: QueryState,
    batch: PreparedBatch,
    executor: Executor,
    post: Option<String>,
    with_original_stats: bool,
}

impl AhrefsClient {
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(ClientConfig::new(token))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        ClientBuilder::new(config).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Parameters of the query under construction.
    pub fn query(&self) -> &QueryParams {
        self.state.params()
    }

    /// Number of queries waiting for [`AhrefsClient::run`].
    pub fn prepared(&self) -> usize {
        self.batch.len()
    }

    /// Invokes a call by its `verb_noun` name, e.g. `where_gt` or
    /// `get_backlinks_new_lost`.
    pub fn call(&mut self, method: &str, args: Vec<Value>) -> Result<Dispatch> {
        self.dispatch(Call::parse(method, args)?)
    }

    pub fn dispatch(&mut self, call: Call) -> Result<Dispatch> {
        let schema = self.config.checking.then(|| Arc::clone(&self.schema));
        let command = call.resolve(schema.as_deref())?;
        debug!(?command, "dispatching");
        self.apply(command)
    }

    fn apply(&mut self, command: Command) -> Result<Dispatch> {
        match command {
            Command::SetParam {
                name,
                value,
            } => self.state.set(name, value.to_string()),
            Command::SetOutput(format) => self.state.set("output", format),
            Command::SetMode(mode) => self.state.set("mode", mode),
            Command::Fetch(table) => return self.fetch(&table).map(Dispatch::Fetched),
            Command::Prepare(table) => self.stash(&table)?,
            Command::Select(columns) => self.append_list("select", &columns),
            Command::OrderBy(columns) => self.append_list("order_by", &columns),
            Command::Where(filter) => {
                let serialized = filter.serialize(Clause::Where, &self.schema)?;
                self.state.push_filter(Clause::Where, filter, &serialized);
            }
            Command::Having(filter) => {
                let serialized = filter.serialize(Clause::Having, &self.schema)?;
                self.state.push_filter(Clause::Having, filter, &serialized);
            }
            Command::RawCondition {
                clause,
                condition,
            } => self.state.append(clause.as_str(), condition),
            Command::RawParam {
                name,
                value,
            } => self.apply_raw_param(name, value),
        }
        Ok(Dispatch::Continue)
    }

    fn apply_raw_param(&mut self, name: String, value: Value) {
        match name.as_str() {
            POST_OPTION => self.post = Some(value.to_string()),
            ORIGINAL_STATS_OPTION => self.with_original_stats = value.is_truthy(),
            "where" | "having" => self.state.append(name, value.to_string()),
            _ => self.state.set(name, value.to_string()),
        }
    }

    fn append_list(&mut self, key: &str, items: &[String]) {
        if !items.is_empty() {
            self.state.append(key, items.join(","));
        }
    }

    /// Sets `from`, validates and resets the builder. The built query is
    /// returned only when validation passed.
    fn finish(&mut self, table: &str) -> Result<QueryParams> {
        self.state.set("from", table);

        let mut errors = check_required(&self.state);
        if self.config.checking {
            errors.extend(Validator::new(&self.schema).check_columns(&self.state));
        }

        let query = self.state.params().clone();
        self.state.reset();

        if !errors.is_empty() {
            warn!(table, errors = errors.len(), "query rejected");
            return Err(ApiError::Validation {
                errors,
            });
        }
        Ok(query)
    }

    fn fetch(&mut self, table: &str) -> Result<String> {
        let query = self.finish(table)?;

        let mut queries = vec![query];
        if self.with_original_stats {
            let mut baseline = queries[0].clone();
            baseline.set("limit", "1");
            queries.push(baseline);
        }

        let bodies = self.executor.execute(&queries, self.post.take());
        self.report();

        let mut bodies = bodies.into_iter();
        let primary = bodies.next().unwrap_or_default();
        Ok(match bodies.next() {
            Some(baseline) => merge_original_stats(&primary, &baseline),
            None => primary,
        })
    }

    fn stash(&mut self, table: &str) -> Result<()> {
        let query = self.finish(table)?;
        debug!(table, "query prepared");
        self.batch.insert(table, query);
        Ok(())
    }

    fn report(&self) {
        if self.config.debug {
            self.executor.log_diagnostics();
        }
    }

    fn chain(&mut self, call: Call) -> Result<&mut Self> {
        self.dispatch(call)?;
        Ok(self)
    }

    /// Sets a registered parameter (`limit`, `offset`, `output`, `target`).
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.chain(Call::new(Verb::Set, Some(name), vec![value.into()]))
    }

    pub fn set_target(&mut self, target: impl Into<Value>) -> Result<&mut Self> {
        self.set("target", target)
    }

    pub fn set_limit(&mut self, limit: impl Into<Value>) -> Result<&mut Self> {
        self.set("limit", limit)
    }

    pub fn set_offset(&mut self, offset: impl Into<Value>) -> Result<&mut Self> {
        self.set("offset", offset)
    }

    pub fn set_output(&mut self, format: impl Into<Value>) -> Result<&mut Self> {
        self.set("output", format)
    }

    /// Sets the response format: `json`, `xml` or `php`.
    pub fn to(&mut self, format: &str) -> Result<&mut Self> {
        self.chain(Call::new(Verb::To, Some(format), Vec::new()))
    }

    pub fn to_json(&mut self) -> Result<&mut Self> {
        self.to("json")
    }

    pub fn to_xml(&mut self) -> Result<&mut Self> {
        self.to("xml")
    }

    pub fn to_php(&mut self) -> Result<&mut Self> {
        self.to("php")
    }

    /// Sets how the target is matched: `exact`, `domain`, `subdomains` or
    /// `prefix`.
    pub fn mode(&mut self, mode: &str) -> Result<&mut Self> {
        self.chain(Call::new(Verb::Mode, Some(mode), Vec::new()))
    }

    pub fn mode_exact(&mut self) -> Result<&mut Self> {
        self.mode("exact")
    }

    pub fn mode_domain(&mut self) -> Result<&mut Self> {
        self.mode("domain")
    }

    pub fn mode_subdomains(&mut self) -> Result<&mut Self> {
        self.mode("subdomains")
    }

    pub fn mode_prefix(&mut self) -> Result<&mut Self> {
        self.mode("prefix")
    }

    pub fn select<I, S>(&mut self, columns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Value>,
    {
        let args = columns.into_iter().map(Into::into).collect();
        self.chain(Call::new(Verb::Select, None, args))
    }

    /// Adds sort keys, each `column` or `column:asc|desc`.
    pub fn order_by<I, S>(&mut self, columns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Value>,
    {
        let args = columns.into_iter().map(Into::into).collect();
        self.chain(Call::new(Verb::Order, Some("by"), args))
    }

    /// Adds a `where` filter using `operator` (`eq`, `gt`, `substring`...).
    pub fn where_(
        &mut self,
        operator: &str,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        self.chain(Call::new(
            Verb::Where,
            Some(operator),
            vec![column.into(), value.into()],
        ))
    }

    /// Adds a `having` filter using `operator` (`eq`, `gt`, `substring`...).
    pub fn having(
        &mut self,
        operator: &str,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        self.chain(Call::new(
            Verb::Having,
            Some(operator),
            vec![column.into(), value.into()],
        ))
    }

    /// Appends an already serialized condition to `where`. It is not checked.
    pub fn where_raw(&mut self, condition: &str) -> Result<&mut Self> {
        self.chain(Call::new(Verb::Where, None, vec![condition.into()]))
    }

    /// Appends an already serialized condition to `having`. It is not checked.
    pub fn having_raw(&mut self, condition: &str) -> Result<&mut Self> {
        self.chain(Call::new(Verb::Having, None, vec![condition.into()]))
    }

    /// Sets an unchecked parameter.
    ///
    /// `post` sends the next request as a POST with the value as its body,
    /// and `withOriginalStats` toggles the baseline stats request of single
    /// fetches. Any other name is sent as a query parameter.
    pub fn params(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.chain(Call::new(Verb::Params, None, vec![name.into(), value.into()]))
    }

    /// Validates the query against `table`, runs it and returns the raw body.
    ///
    /// A transport failure yields an empty body; see [`Self::diagnostics`].
    pub fn get(&mut self, table: &str) -> Result<String> {
        let dispatch = self.dispatch(Call::new(Verb::Get, Some(table), Vec::new()))?;
        Ok(dispatch.into_body().unwrap_or_default())
    }

    /// Validates the query against `table` and keeps it for [`Self::run`].
    pub fn prepare(&mut self, table: &str) -> Result<&mut Self> {
        self.chain(Call::new(Verb::Prepare, Some(table), Vec::new()))
    }

    /// Runs every prepared query concurrently and returns their bodies keyed
    /// by table. The batch and the builder are reset afterwards.
    pub fn run(&mut self) -> BatchResults {
        let entries = self.batch.take();
        self.state.reset();
        if entries.is_empty() {
            debug!("no prepared queries to run");
            return BatchResults::default();
        }

        let (tables, queries): (Vec<String>, Vec<QueryParams>) = entries.into_iter().unzip();
        let bodies = self.executor.execute(&queries, self.post.take());
        self.report();

        BatchResults::new(tables.into_iter().zip(bodies).collect())
    }

    /// The URL a `get` against `table` would request. Nothing is sent and
    /// the builder is left as is.
    pub fn url_for(&self, table: &str) -> String {
        let mut query = self.state.params().clone();
        query.set("from", table);
        self.executor.url(&query)
    }

    /// Per-request diagnostics of the most recent execution.
    pub fn diagnostics(&self) -> &[RequestDiagnostic] {
        self.executor.diagnostics()
    }

    pub fn last_transport_error(&self) -> Option<&str> {
        self.executor.last_transport_error()
    }

    /// Drops the query under construction, keeping `output`, `target` and
    /// `mode`.
    pub fn reset(&mut self) -> &mut Self {
        self.state.reset();
        self
    }
}

macro_rules! filter_shorthands {
    ($($op:literal => $where_fn:ident, $having_fn:ident;)*) => {
        impl AhrefsClient {
            $(
                #[doc = concat!("Shorthand for `where_(\"", $op, "\", column, value)`.")]
                pub fn $where_fn(&mut self, column: &str, value: impl Into<Value>) -> Result<&mut Self> {
                    self.where_($op, column, value)
                }

                #[doc = concat!("Shorthand for `having(\"", $op, "\", column, value)`.")]
                pub fn $having_fn(&mut self, column: &str, value: impl Into<Value>) -> Result<&mut Self> {
                    self.having($op, column, value)
                }
            )*
        }
    };
}

filter_shorthands! {
    "eq" => where_eq, having_eq;
    "ne" => where_ne, having_ne;
    "gt" => where_gt, having_gt;
    "gte" => where_gte, having_gte;
    "lt" => where_lt, having_lt;
    "lte" => where_lte, having_lte;
    "substring" => where_substring, having_substring;
    "word" => where_word, having_word;
}

#[cfg(test)]
mod tests {
    use serde_json::Value as JsonValue;

    use super::*;
    use crate::test_utils::{closed_port_url, FakeTransport};

    fn client(transport: &FakeTransport) -> AhrefsClient {
        AhrefsClient::builder("t0k")
            .api_url("http://api")
            .transport(Box::new(transport.clone()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_blank_token_fails_construction() {
        let result = AhrefsClient::builder("")
            .transport(Box::new(FakeTransport::new()))
            .build();
        assert!(matches!(result, Err(ApiError::MissingToken)));
    }

    #[test]
    fn test_get_builds_url_in_call_order() {
        let transport = FakeTransport::new().respond("from=ahrefs_rank", r#"{"pages":[]}"#);
        let mut client = client(&transport);

        let body = client
            .set_target("ahrefs.com")
            .unwrap()
            .mode_domain()
            .unwrap()
            .select(["url", "ahrefs_rank"])
            .unwrap()
            .set_limit(10)
            .unwrap()
            .get("ahrefs_rank")
            .unwrap();

        assert_eq!(body, r#"{"pages":[]}"#);
        assert_eq!(
            transport.urls(),
            vec![
                "http://api/?output=json&target=ahrefs.com&mode=domain\
                 &select=url%2Cahrefs_rank&limit=10&from=ahrefs_rank&token=t0k"
            ]
        );
    }

    #[test]
    fn test_filters_are_serialized_into_the_url() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);

        client
            .set_target("ahrefs.com")
            .unwrap()
            .mode_domain()
            .unwrap()
            .where_gt("date", "2013-11-24")
            .unwrap()
            .having_eq("type", "lost")
            .unwrap();
        assert_eq!(client.query().get("where"), Some(r#"date>="2013-11-24""#));
        assert_eq!(client.query().get("having"), Some(r#"type="lost""#));

        client.get("refdomains_new_lost").unwrap();
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_reset_after_get_keeps_only_carried_params() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);

        client
            .set_target("ahrefs.com")
            .unwrap()
            .mode_domain()
            .unwrap()
            .select(["url"])
            .unwrap()
            .where_eq("ahrefs_rank", 14)
            .unwrap()
            .get("ahrefs_rank")
            .unwrap();

        assert_eq!(
            client.query().to_query_string(),
            "output=json&target=ahrefs.com&mode=domain"
        );

        client.get("ahrefs_rank").unwrap();
        let urls = transport.urls();
        assert!(!urls[1].contains("select="));
        assert!(!urls[1].contains("where="));
    }

    #[test]
    fn test_where_on_having_only_column_sends_nothing() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);

        let err = client
            .set_target("ahrefs.com")
            .unwrap()
            .mode_domain()
            .unwrap()
            .where_eq("type", "lost")
            .unwrap()
            .get("refdomains_new_lost")
            .unwrap_err();

        match err {
            ApiError::Validation {
                errors,
            } => {
                assert_eq!(
                    errors,
                    vec!["Column type can not be used in 'where' condition in table refdomains_new_lost"]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(transport.requests().is_empty());
        assert!(client.query().get("where").is_none());
    }

    #[test]
    fn test_validation_errors_accumulate() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);

        client.select(["bogus"]).unwrap();
        let err = client.get("anchors").unwrap_err();
        let ApiError::Validation {
            errors,
        } = err
        else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors,
            vec![
                "target is required",
                "mode is required",
                "No column bogus to select in table anchors",
            ]
        );
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_select_star_is_rejected() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);

        let err = client
            .set_target("ahrefs.com")
            .unwrap()
            .mode_domain()
            .unwrap()
            .select(["*"])
            .unwrap()
            .get("pages")
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Validation { errors } if errors == ["No column * to select in table pages"]
        ));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_wide_limit_is_sent_verbatim() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);

        client.set_limit(u64::MAX).unwrap();
        assert_eq!(client.query().get("limit"), Some("18446744073709551615"));
    }

    #[test]
    fn test_debug_client_reports_diagnostics() {
        let transport = FakeTransport::new().fail("from=anchors", "timed out");
        let mut client = AhrefsClient::builder("t0k")
            .api_url("http://api")
            .debug(true)
            .transport(Box::new(transport.clone()))
            .build()
            .unwrap();
        assert!(client.config().debug);

        client.get("subscription_info").unwrap();
        client
            .set_target("ahrefs.com")
            .unwrap()
            .mode_domain()
            .unwrap()
            .prepare("pages")
            .unwrap()
            .prepare("anchors")
            .unwrap();
        let results = client.run();

        assert_eq!(results.get("anchors"), Some(""));
        assert_eq!(client.diagnostics().len(), 2);
        assert_eq!(transport.requests().len(), 3);
    }

    #[test]
    fn test_unreachable_api_degrades_to_empty_bodies() {
        let mut client = AhrefsClient::builder("t0k")
            .api_url(closed_port_url())
            .build()
            .unwrap();

        let body = client.get("subscription_info").unwrap();

        assert_eq!(body, "");
        assert!(client.last_transport_error().is_some());
        assert!(client.diagnostics()[0].is_error());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_get_inside_multi_thread_runtime() {
        let mut client = AhrefsClient::builder("t0k")
            .api_url(closed_port_url())
            .build()
            .unwrap();

        assert_eq!(client.get("subscription_info").unwrap(), "");
        assert!(client.diagnostics()[0].is_error());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_get_inside_current_thread_runtime() {
        let mut client = AhrefsClient::builder("t0k")
            .api_url(closed_port_url())
            .build()
            .unwrap();

        assert_eq!(client.get("subscription_info").unwrap(), "");
        assert!(client.last_transport_error().is_some());
    }

    #[test]
    fn test_subscription_info_needs_no_target() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);
        assert!(client.get("subscription_info").is_ok());
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_batch_run_keyed_by_table() {
        let transport = FakeTransport::new()
            .respond("from=refdomains", "refdomains body")
            .respond("from=ahrefs_rank", "rank body");
        let mut client = client(&transport);

        client
            .set_target("ahrefs.com")
            .unwrap()
            .mode_domain()
            .unwrap()
            .set_limit(5)
            .unwrap()
            .prepare("refdomains")
            .unwrap()
            .select(["url"])
            .unwrap()
            .prepare("ahrefs_rank")
            .unwrap();
        assert_eq!(client.prepared(), 2);
        assert!(transport.requests().is_empty());

        let results = client.run();
        assert_eq!(results.len(), 2);
        assert_eq!(results.get("refdomains"), Some("refdomains body"));
        assert_eq!(results.get("ahrefs_rank"), Some("rank body"));
        assert_eq!(client.prepared(), 0);
        assert_eq!(client.diagnostics().len(), 2);

        let urls = transport.urls();
        assert!(urls[0].contains("limit=5"));
        assert!(!urls[1].contains("limit=5"));
    }

    #[test]
    fn test_partial_batch_failure() {
        let transport = FakeTransport::new()
            .respond("from=pages", "pages body")
            .fail("from=anchors", "timed out");
        let mut client = client(&transport);

        client
            .set_target("ahrefs.com")
            .unwrap()
            .mode_domain()
            .unwrap()
            .prepare("pages")
            .unwrap()
            .prepare("anchors")
            .unwrap();
        let results = client.run();

        assert_eq!(results.get("pages"), Some("pages body"));
        assert_eq!(results.get("anchors"), Some(""));
        let diagnostics = client.diagnostics();
        assert!(diagnostics[0].error.is_none());
        assert_eq!(diagnostics[1].error.as_deref(), Some("timed out"));
    }

    #[test]
    fn test_total_batch_failure() {
        let transport = FakeTransport::new().fail_batch("connection refused");
        let mut client = client(&transport);

        client
            .set_target("ahrefs.com")
            .unwrap()
            .mode_domain()
            .unwrap()
            .prepare("pages")
            .unwrap()
            .prepare("anchors")
            .unwrap();
        let results = client.run();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, body)| body.is_empty()));
        assert!(client.last_transport_error().is_some());
    }

    #[test]
    fn test_rejected_prepare_is_not_stashed() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);

        assert!(client.prepare("pages").is_err());
        assert_eq!(client.prepared(), 0);
        assert!(client.run().is_empty());
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_original_stats() {
        let transport = FakeTransport::new()
            .respond("limit=1", r#"{"pages":[],"stats":{"pages":120}}"#)
            .respond("from=pages", r#"{"pages":[{"url":"a"}],"stats":{"pages":1}}"#);
        let mut client = client(&transport);

        let body = client
            .params("withOriginalStats", true)
            .unwrap()
            .set_target("ahrefs.com")
            .unwrap()
            .mode_domain()
            .unwrap()
            .get("pages")
            .unwrap();

        let value: JsonValue = serde_json::from_str(&body).unwrap();
        assert_eq!(value["stats"]["pages"], 1);
        assert_eq!(value["originalStats"]["pages"], 120);
        assert_eq!(transport.requests().len(), 2);
        assert!(transport.urls()[1].ends_with("&limit=1&token=t0k"));
    }

    #[test]
    fn test_post_applies_to_next_request_only() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);

        client.params("post", "ahrefs.com\nmoz.com").unwrap();
        client.get("subscription_info").unwrap();
        client.get("subscription_info").unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].body.as_deref(), Some("ahrefs.com\nmoz.com"));
        assert!(!requests[1].is_post());
    }

    #[test]
    fn test_raw_params_and_conditions() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);

        client
            .params("beta_flag", 1)
            .unwrap()
            .where_raw("refdomain=\"x\"")
            .unwrap()
            .where_eq("domain_rating", 50)
            .unwrap();

        assert_eq!(client.query().get("beta_flag"), Some("1"));
        assert_eq!(client.query().get("where"), Some("refdomain=\"x\",domain_rating=50"));
    }

    #[test]
    fn test_call_by_name() {
        let transport = FakeTransport::new().respond("from=backlinks_new_lost", "new lost");
        let mut client = client(&transport);

        assert_eq!(
            client.call("set_target", vec!["ahrefs.com".into()]).unwrap(),
            Dispatch::Continue
        );
        client.call("mode_exact", vec![]).unwrap();
        client.call("to_xml", vec![]).unwrap();
        assert_eq!(client.query().get("output"), Some("xml"));

        let dispatch = client.call("get_backlinks_new_lost", vec![]).unwrap();
        assert_eq!(dispatch, Dispatch::Fetched("new lost".to_string()));
    }

    #[test]
    fn test_unknown_calls_do_not_mutate() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);
        let before = client.query().clone();

        assert!(matches!(
            client.call("fly_away", vec![]),
            Err(ApiError::UnknownOperation(_))
        ));
        assert!(matches!(
            client.call("set_colour", vec!["red".into()]),
            Err(ApiError::UnknownFunction(_))
        ));
        assert!(matches!(client.mode("everything"), Err(ApiError::UnknownFunction(_))));
        assert!(client.get("nowhere").is_err());

        assert_eq!(client.query(), &before);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_unchecked_client_accepts_unregistered_tables() {
        let transport = FakeTransport::new();
        let mut client = AhrefsClient::builder("t0k")
            .api_url("http://api")
            .checking(false)
            .transport(Box::new(transport.clone()))
            .build()
            .unwrap();

        client
            .set_target("ahrefs.com")
            .unwrap()
            .mode_domain()
            .unwrap()
            .select(["anything"])
            .unwrap()
            .get("future_table")
            .unwrap();
        assert!(transport.urls()[0].contains("from=future_table"));
    }

    #[test]
    fn test_url_for_does_not_execute() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);

        client.set_target("ahrefs.com").unwrap().mode_prefix().unwrap();
        assert_eq!(
            client.url_for("pages"),
            "http://api/?output=json&target=ahrefs.com&mode=prefix&from=pages&token=t0k"
        );
        assert!(transport.requests().is_empty());
        assert!(client.query().get("from").is_none());
    }

    #[test]
    fn test_explicit_reset() {
        let transport = FakeTransport::new();
        let mut client = client(&transport);

        client.set_target("ahrefs.com").unwrap().set_offset(100).unwrap();
        client.reset();
        assert_eq!(client.query().to_query_string(), "output=json&target=ahrefs.com");
    }
}
