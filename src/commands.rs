use crate::config::Config;
use crate::script::statement::Statement;
use crate::script::{ArgList, Code, Emitter, Fault, Permission, Predicate};
use crate::services::RoleService;
use crate::state::input::Input;
use crate::state::registry::Registry;
use crate::store::{Scope, Store, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

mod data;
mod help;
mod incr;
mod introspect;
mod link;
mod num;
mod rank;
mod rise;

pub type CommandResult = Result<Code, CommandError>;

/// A named script command. `run` emits its output through `out`, chunk by chunk, and returns
/// the status code that ends the invocation.
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    /// Multi-line description; the first line is the summary `help` lists.
    fn help(&self) -> &'static str;

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult;
}

/// A named pre-execution hook. It picks the permission predicate the command runs under and
/// never produces output.
#[async_trait]
pub trait Modifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(&self, ctx: &CmdCtx) -> Result<Permission, CommandError>;
}

//noinspection RsExternalLinter
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),

    #[error("problem data: {0}")]
    Data(Value),
}

impl CommandError {
    /// Name reported in `Neax::<name> =` lines.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::Store(_) => "StoreError",
            CommandError::Json(_) => "SyntaxError",
            CommandError::Custom(_) => "Problem",
            CommandError::Data(_) => "ProblemData",
        }
    }

    pub fn to_fault(&self) -> Fault {
        match self {
            CommandError::Custom(text) => Fault::problem(text.clone()),
            CommandError::Data(data) => Fault::Data(data.clone()),
            other => Fault::from_error(other.kind(), other),
        }
    }
}

/// Command context passed to command handlers and modifiers
pub struct CmdCtx {
    /// Stores, roles and configuration
    pub registry: Arc<Registry>,
    /// Commands and modifiers known to the interpreter
    pub catalog: Arc<Catalog>,
    /// The message that carried the script
    pub input: Input,
    /// Invoking identity
    pub author: String,
    /// Resolved target identity (may be empty)
    pub target: String,
    pub args: ArgList,
    /// Command name as written
    pub name: String,
    pub modifier: Option<String>,
    pub is_author_admin: bool,
    pub is_target_admin: bool,
    active: Predicate,
    rise: Predicate,
}

impl CmdCtx {
    pub fn new(registry: Arc<Registry>, catalog: Arc<Catalog>, input: &Input, stmt: &Statement) -> Self {
        let author = input.sender_id.clone();
        let is_author_admin = registry.roles.is_admin(&author);
        let is_target_admin = registry.roles.is_admin(&stmt.target);

        Self {
            active: Predicate::new(Permission::Strict, &author, &stmt.target, is_author_admin),
            rise: Predicate::new(Permission::Rise, &author, &stmt.target, is_author_admin),
            registry,
            catalog,
            input: input.clone(),
            author,
            target: stmt.target.clone(),
            args: ArgList::parse(&stmt.tail),
            name: stmt.command.clone(),
            modifier: stmt.modifier.clone(),
            is_author_admin,
            is_target_admin,
        }
    }

    /// Makes `permission` the active predicate.
    pub(crate) fn set_permission(&mut self, permission: Permission) {
        self.active = Predicate::new(permission, &self.author, &self.target, self.is_author_admin);
    }

    pub fn permission(&self) -> Permission {
        self.active.kind()
    }

    /// Active predicate: strict unless a modifier elevated it.
    pub fn is_allowed(&self, a: &str, b: &str) -> bool {
        self.active.allows(a, b)
    }

    pub fn is_target_allowed(&self) -> bool {
        self.active.allows_target()
    }

    /// Rise-able predicate: administrators always pass.
    pub fn rise_allowed(&self, a: &str, b: &str) -> bool {
        self.rise.allows(a, b)
    }

    pub fn rise_target_allowed(&self) -> bool {
        self.rise.allows_target()
    }

    pub fn store(&self, scope: Scope) -> &dyn Store {
        self.registry.store(scope)
    }

    pub fn users(&self) -> &dyn Store {
        self.store(Scope::Users)
    }

    pub fn global(&self) -> &dyn Store {
        self.store(Scope::Global)
    }

    pub fn roles(&self) -> &dyn RoleService {
        self.registry.roles.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.registry.config
    }
}

/// Order-stable catalog of commands plus the modifier table.
#[derive(Default)]
pub struct Catalog {
    commands: Vec<Arc<dyn Command>>,
    index: HashMap<&'static str, usize>,
    modifiers: HashMap<&'static str, Arc<dyn Modifier>>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every built-in command, in the order `help` lists them, and the `rise` modifier.
    pub fn builtin() -> Self {
        let mut c = Self::empty();
        c.register(introspect::Print);
        c.register(introspect::Arg);
        c.register(rank::Rank::promote());
        c.register(rank::Rank::demote());
        c.register(rank::Rank::mpromote());
        c.register(rank::Rank::mdemote());
        c.register(data::Set::new(Scope::Users));
        c.register(data::Set::new(Scope::Threads));
        c.register(data::Get::new(Scope::Users));
        c.register(data::Get::new(Scope::Threads));
        c.register(introspect::InputGet);
        c.register(link::Link);
        c.register(link::Unlink);
        c.register(link::Links);
        c.register(incr::Incr::new(Scope::Users));
        c.register(incr::Incr::new(Scope::Threads));
        c.register(num::Num);
        c.register(help::Help);

        c.register_modifier(rise::Rise);
        c
    }

    /// Adds a command, replacing any command of the same name in place.
    pub fn register(&mut self, command: impl Command + 'static) {
        let name = command.name();
        let command: Arc<dyn Command> = Arc::new(command);
        match self.index.get(name) {
            Some(&idx) => self.commands[idx] = command,
            None => {
                self.index.insert(name, self.commands.len());
                self.commands.push(command);
            }
        }
    }

    pub fn register_modifier(&mut self, modifier: impl Modifier + 'static) {
        self.modifiers.insert(modifier.name(), Arc::new(modifier));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.index.get(name).map(|&idx| &self.commands[idx])
    }

    pub fn modifier(&self, name: &str) -> Option<&Arc<dyn Modifier>> {
        self.modifiers.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// First line of a help text, used for one-line listings.
pub fn summary(help: &str) -> &str {
    help.trim().lines().next().unwrap_or("").trim()
}
