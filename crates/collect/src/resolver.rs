use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// An external reporter that can be run directly or through a package bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub binary: &'static str,
    pub package: &'static str,
    pub version: &'static str,
}

impl ToolSpec {
    pub fn pinned_package(&self) -> String {
        format!("{}@{}", self.package, self.version)
    }
}

/// `command prefix_args... <tool args>` runs the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub prefix_args: Vec<String>,
}

impl Invocation {
    pub fn direct(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            prefix_args: Vec::new(),
        }
    }
}

type Lookup = Box<dyn Fn(&str) -> Option<PathBuf> + Send + Sync>;

/// Picks the cheapest way to run each tool once per process and remembers it.
pub struct ToolResolver {
    lookup: Lookup,
    cache: Mutex<HashMap<&'static str, Invocation>>,
}

impl Default for ToolResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolResolver {
    pub fn new() -> Self {
        Self::with_lookup(|name| which::which(name).ok())
    }

    /// `lookup` finds an executable on the search path.
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<PathBuf> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, tool: &ToolSpec) -> Invocation {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(found) = cache.get(tool.binary) {
            return found.clone();
        }
        let invocation = self.detect(tool);
        cache.insert(tool.binary, invocation.clone());
        invocation
    }

    pub fn cached(&self, tool: &ToolSpec) -> Option<Invocation> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(tool.binary)
            .cloned()
    }

    fn detect(&self, tool: &ToolSpec) -> Invocation {
        if let Some(path) = (self.lookup)(tool.binary) {
            tracing::debug!(tool = tool.binary, path = %path.display(), "using installed binary");
            return Invocation::direct(path.to_string_lossy().to_string());
        }
        let invocation = if let Some(bunx) = (self.lookup)("bunx") {
            Invocation {
                command: bunx.to_string_lossy().to_string(),
                prefix_args: vec![tool.pinned_package()],
            }
        } else {
            Invocation {
                command: "npx".to_string(),
                prefix_args: vec!["--yes".to_string(), tool.pinned_package()],
            }
        };
        tracing::debug!(tool = tool.binary, command = %invocation.command, "using package bridge");
        eprintln!(
            "hint: install `{}` globally (npm install -g {}) for faster syncs",
            tool.binary, tool.package
        );
        invocation
    }
}
