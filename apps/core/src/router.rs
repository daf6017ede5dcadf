use crate::registry::ModuleRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub module_id: String,
    pub query: String,
}

/// The routing decision for one text change, stamped with the generation
/// every batch answering it must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub generation: u64,
    pub empty_input: bool,
    pub routes: Vec<Route>,
}

/// Decides which providers see `input`.
///
/// A leading character equal to an enabled provider's prefix sends the rest
/// of the input, trimmed, to that provider alone. Anything else goes, trimmed,
/// to every enabled global provider. A space never acts as a prefix.
pub fn route(registry: &ModuleRegistry, input: &str) -> Vec<Route> {
    let mut chars = input.chars();
    let Some(first_char) = chars.next() else {
        return Vec::new();
    };

    if let Some(descriptor) = registry.find_prefix_match(first_char) {
        return vec![Route {
            module_id: descriptor.module_id.clone(),
            query: chars.as_str().trim().to_string(),
        }];
    }

    let query = input.trim();
    registry
        .global_providers()
        .into_iter()
        .map(|descriptor| Route {
            module_id: descriptor.module_id.clone(),
            query: query.to_string(),
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct QueryRouter {
    generation: u64,
}

impl QueryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `input` under a fresh generation. Empty input still advances
    /// the generation so late batches for the previous text are dropped.
    pub fn dispatch(&mut self, registry: &ModuleRegistry, input: &str) -> Dispatch {
        self.generation += 1;
        Dispatch {
            generation: self.generation,
            empty_input: input.is_empty(),
            routes: route(registry, input),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
