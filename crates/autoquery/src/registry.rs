//! Extension points: query filters that adjust a translated query, and response hooks
//! that evaluate aggregate commands the engine does not know.
//!
//! A registry is filled in at startup and only read afterwards.

use std::fmt;
use std::sync::Arc;

use query_engine_execution::response::{Meta, QueryResponse};
use query_engine_metadata::metadata::DescriptorInfo;
use query_engine_translation::translation::error::Error;
use query_engine_translation::translation::query::{AggregateCommand, ConstructedQuery, QueryRequest};

/// Adjusts a translated query before it is executed.
pub type QueryFilter = dyn Fn(&mut ConstructedQuery, &QueryRequest) -> Result<(), Error> + Send + Sync;

/// Evaluates some of the remaining aggregate commands into `meta`, and returns the indices
/// of the commands it claimed.
pub type ResponseHook =
    dyn Fn(&ResponseContext<'_>, &[AggregateCommand], &mut Meta) -> Vec<usize> + Send + Sync;

/// What a query filter is registered against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTarget {
    /// One descriptor, by name.
    Descriptor(String),
    /// Every descriptor with this capability.
    Capability(String),
}

impl FilterTarget {
    fn applies_to(&self, name: &str, descriptor: &DescriptorInfo) -> bool {
        match self {
            FilterTarget::Descriptor(target) => target == name,
            FilterTarget::Capability(capability) => descriptor
                .capabilities
                .iter()
                .any(|tag| tag.as_str() == capability),
        }
    }
}

/// The request and results response hooks run for.
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    pub request: &'a QueryRequest,
    pub response: &'a QueryResponse,
}

#[derive(Clone, Default)]
pub struct Registry {
    filters: Vec<(FilterTarget, Arc<QueryFilter>)>,
    response_hooks: Vec<Arc<ResponseHook>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field(
                "filters",
                &self.filters.iter().map(|(target, _)| target).collect::<Vec<_>>(),
            )
            .field("response_hooks", &self.response_hooks.len())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register a query filter. Filters run in registration order.
    pub fn register_filter<F>(&mut self, target: FilterTarget, filter: F) -> &mut Self
    where
        F: Fn(&mut ConstructedQuery, &QueryRequest) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.filters.push((target, Arc::new(filter)));
        self
    }

    /// Register a response hook. Hooks run once per request in registration order, each
    /// seeing only the commands no earlier hook claimed. That may be none at all.
    pub fn register_response_hook<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&ResponseContext<'_>, &[AggregateCommand], &mut Meta) -> Vec<usize>
            + Send
            + Sync
            + 'static,
    {
        self.response_hooks.push(Arc::new(hook));
        self
    }

    /// Register a function aggregate commands can call by name, ignoring case.
    /// A command is claimed when the function returns a value for its arguments.
    pub fn register_aggregate_function<F>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(&[String]) -> Option<String> + Send + Sync + 'static,
    {
        let name = name.into();
        self.register_response_hook(move |_, commands, meta| {
            commands
                .iter()
                .enumerate()
                .filter(|(_, command)| command.is(&name))
                .filter_map(|(index, command)| {
                    let value = function(&command.args)?;
                    meta.insert(command.label(), value);
                    Some(index)
                })
                .collect()
        })
    }

    /// The filters applying to a descriptor, in registration order.
    pub(crate) fn filters_for<'a>(
        &'a self,
        name: &'a str,
        descriptor: &'a DescriptorInfo,
    ) -> impl Iterator<Item = &'a QueryFilter> + 'a {
        self.filters
            .iter()
            .filter(move |(target, _)| target.applies_to(name, descriptor))
            .map(|(_, filter)| filter.as_ref())
    }

    /// Run the response hooks over the commands. Commands no hook claims are dropped.
    pub(crate) fn run_response_hooks(
        &self,
        context: &ResponseContext<'_>,
        mut commands: Vec<AggregateCommand>,
        meta: &mut Meta,
    ) {
        for hook in &self.response_hooks {
            let mut claimed = hook(context, &commands, meta);
            claimed.sort_unstable();
            claimed.dedup();
            for index in claimed.into_iter().rev() {
                if index < commands.len() {
                    commands.remove(index);
                }
            }
        }
        for command in &commands {
            tracing::debug!("dropping unclaimed aggregate command '{}'", command.label());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(include: &str) -> Vec<AggregateCommand> {
        query_engine_translation::translation::query::aggregates::parse_commands(include)
    }

    #[test]
    fn hooks_only_see_unclaimed_commands() {
        let mut registry = Registry::new();
        registry
            .register_aggregate_function("ADD", |args| {
                let sum: i64 = args
                    .iter()
                    .map(|arg| arg.trim().parse::<i64>().ok())
                    .sum::<Option<i64>>()?;
                Some(sum.to_string())
            })
            .register_response_hook(|_, commands, meta| {
                meta.insert("remaining".to_string(), commands.len().to_string());
                vec![]
            });

        let request = QueryRequest::new("QueryRockstars");
        let response = QueryResponse::default();
        let context = ResponseContext {
            request: &request,
            response: &response,
        };
        let mut meta = Meta::new();
        registry.run_response_hooks(
            &context,
            commands("ADD(6,2), add(1, 2) Three, ADD(one), Bar"),
            &mut meta,
        );

        assert_eq!(
            meta,
            Meta::from([
                ("ADD(6,2)".to_string(), "8".to_string()),
                ("Three".to_string(), "3".to_string()),
                ("remaining".to_string(), "2".to_string()),
            ])
        );
    }

    #[test]
    fn hooks_run_without_commands() {
        let mut registry = Registry::new();
        registry
            .register_response_hook(|_, commands, _| (0..commands.len()).collect())
            .register_response_hook(|context, commands, meta| {
                meta.insert("remaining".to_string(), commands.len().to_string());
                meta.insert("rows".to_string(), context.response.results.len().to_string());
                vec![]
            });

        let request = QueryRequest::new("QueryRockstars");
        let response = QueryResponse::default();
        let context = ResponseContext {
            request: &request,
            response: &response,
        };
        let mut meta = Meta::new();
        registry.run_response_hooks(&context, commands("Bar, Baz"), &mut meta);

        assert_eq!(
            meta,
            Meta::from([
                ("remaining".to_string(), "0".to_string()),
                ("rows".to_string(), "0".to_string()),
            ])
        );
    }
}
