//! Capability registry and trait definition.
//!
//! Defines the `Capability` async trait, an adapter that runs synchronous
//! capabilities on the blocking pool, and the registry that maps
//! `(module, function)` pairs to invokable units.

pub mod file_system;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AgentError, CapabilityError, NotRegistered};
use crate::types::{is_outbound_module, ActionOutcome, Args};

/// A named automation primitive invoked with resolved keyword arguments.
#[async_trait]
pub trait Capability: Send + Sync {
    async fn invoke(&self, args: Args) -> Result<ActionOutcome, CapabilityError>;
}

/// Adapter for a synchronous capability.
///
/// Each call runs on tokio's blocking pool so the outbound channel stays
/// responsive while the capability works.
pub struct BlockingCapability<F> {
    func: Arc<F>,
}

impl<F> BlockingCapability<F>
where
    F: Fn(Args) -> Result<Value, CapabilityError> + Send + Sync + 'static,
{
    pub fn new(func: F) -> Self {
        Self {
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl<F> Capability for BlockingCapability<F>
where
    F: Fn(Args) -> Result<Value, CapabilityError> + Send + Sync + 'static,
{
    async fn invoke(&self, args: Args) -> Result<ActionOutcome, CapabilityError> {
        let func = Arc::clone(&self.func);
        let value = tokio::task::spawn_blocking(move || func(args)).await??;
        Ok(ActionOutcome::from(value))
    }
}

/// Registry of capabilities, keyed by module then function name.
///
/// Built once at startup. The outbound module is never registered here; the
/// execution loop handles it directly.
#[derive(Default)]
pub struct CapabilityRegistry {
    modules: HashMap<String, HashMap<String, Arc<dyn Capability>>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in capabilities.
    pub fn register_defaults(&mut self) {
        for (function, capability) in file_system::capabilities() {
            self.modules
                .entry(file_system::MODULE.to_string())
                .or_default()
                .insert(function.to_string(), capability);
        }
    }

    /// Register a capability. Re-registering a pair replaces the old one.
    pub fn register<C>(&mut self, module: &str, function: &str, capability: C) -> Result<(), AgentError>
    where
        C: Capability + 'static,
    {
        if is_outbound_module(module) {
            return Err(AgentError::ReservedModule(module.to_string()));
        }
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(function.to_string(), Arc::new(capability));
        Ok(())
    }

    /// Register a synchronous capability through [`BlockingCapability`].
    pub fn register_blocking<F>(&mut self, module: &str, function: &str, func: F) -> Result<(), AgentError>
    where
        F: Fn(Args) -> Result<Value, CapabilityError> + Send + Sync + 'static,
    {
        self.register(module, function, BlockingCapability::new(func))
    }

    /// Look up a capability. Absence is a normal outcome, not a fault.
    pub fn lookup(&self, module: &str, function: &str) -> Result<Arc<dyn Capability>, NotRegistered> {
        self.modules
            .get(module)
            .and_then(|functions| functions.get(function))
            .cloned()
            .ok_or_else(|| NotRegistered {
                module: module.to_string(),
                function: function.to_string(),
            })
    }

    /// Total number of registered (module, function) pairs.
    pub fn len(&self) -> usize {
        self.modules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Capability for Echo {
        async fn invoke(&self, args: Args) -> Result<ActionOutcome, CapabilityError> {
            Ok(ActionOutcome::success(Value::Object(args)))
        }
    }

    #[tokio::test]
    async fn test_register_and_invoke_async() {
        let mut registry = CapabilityRegistry::new();
        registry.register("debug", "echo", Echo).unwrap();

        let cap = registry.lookup("debug", "echo").unwrap();
        let mut args = Args::new();
        args.insert("a".to_string(), json!(1));
        let outcome = cap.invoke(args).await.unwrap();
        assert_eq!(outcome, ActionOutcome::success(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_blocking_capability_classifies_result() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_blocking("debug", "halt", |_| Ok(json!({"text": "enough", "stop_chain": true})))
            .unwrap();

        let outcome = registry.lookup("debug", "halt").unwrap().invoke(Args::new()).await.unwrap();
        assert!(outcome.halts());
    }

    #[tokio::test]
    async fn test_blocking_capability_error_propagates() {
        let cap = BlockingCapability::new(|_| Err(CapabilityError::Failed("nope".to_string())));
        let err = cap.invoke(Args::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[tokio::test]
    async fn test_blocking_capability_panic_becomes_error() {
        let cap = BlockingCapability::new(|_| -> Result<Value, CapabilityError> { panic!("bad") });
        let err = cap.invoke(Args::new()).await.unwrap_err();
        assert!(matches!(err, CapabilityError::Worker(_)));
    }

    #[test]
    fn test_lookup_unknown_module_and_function() {
        let mut registry = CapabilityRegistry::new();
        registry.register("debug", "echo", Echo).unwrap();

        let miss = registry.lookup("unknown", "x").err().unwrap();
        assert_eq!(miss.to_string(), "unknown.x not available");

        let miss = registry.lookup("debug", "missing").err().unwrap();
        assert_eq!(miss.to_string(), "debug.missing not available");
    }

    #[test]
    fn test_outbound_module_is_reserved() {
        let mut registry = CapabilityRegistry::new();
        assert!(matches!(
            registry.register("outbound", "send", Echo),
            Err(AgentError::ReservedModule(_))
        ));
        assert!(matches!(
            registry.register("telegram", "send_message", Echo),
            Err(AgentError::ReservedModule(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_defaults() {
        let mut registry = CapabilityRegistry::new();
        registry.register_defaults();
        assert!(registry.lookup("file_system", "read_file").is_ok());
        assert!(registry.lookup("file_system", "list_files").is_ok());
        assert_eq!(registry.len(), 2);
    }
}
