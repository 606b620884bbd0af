//! Command registry: alias resolution, listing and similarity search.
//!
//! Every alias of every registered command is a key in an insertion-ordered
//! alias table. Several aliases may share one `Arc<dyn Command<C>>`; listings
//! deduplicate by identity. Binding an alias that already exists replaces its
//! command but keeps its position, so iteration order stays stable.
//!
//! The table sits behind `Arc<RwLock<..>>` so the built-in help command can hold
//! a non-owning [`RegistryView`] into the live contents.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use tracing::debug;

use crate::command::Command;
use crate::help::{HelpCommand, Output, stdout_output};
use crate::style::Theme;

/// Shared handle to a registered command.
pub type SharedCommand<C> = Arc<dyn Command<C>>;

/// Factory for a help command that needs to read the registry.
pub type HelpFactory<C> = Box<dyn FnOnce(RegistryView<C>) -> SharedCommand<C>>;

struct AliasTable<C> {
    entries: Vec<(String, SharedCommand<C>)>,
    index: HashMap<String, usize>,
}

impl<C> AliasTable<C> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn bind(&mut self, command: &SharedCommand<C>) {
        let spec = command.spec();
        debug!(command = %spec.title(), aliases = ?spec.aliases(), "Registering command");
        for alias in spec.aliases() {
            match self.index.get(alias) {
                Some(&i) => {
                    debug!(alias = %alias, previous = %self.entries[i].1.spec().title(), "Alias rebound");
                    self.entries[i].1 = Arc::clone(command);
                }
                None => {
                    self.index.insert(alias.clone(), self.entries.len());
                    self.entries.push((alias.clone(), Arc::clone(command)));
                }
            }
        }
    }

    fn get(&self, alias: &str) -> Option<SharedCommand<C>> {
        self.index
            .get(alias)
            .map(|&i| Arc::clone(&self.entries[i].1))
    }

    /// Distinct commands having at least one alias that satisfies `pred`.
    fn distinct_where(&self, mut pred: impl FnMut(&str) -> bool) -> Vec<SharedCommand<C>> {
        let mut out: Vec<SharedCommand<C>> = Vec::new();
        for (alias, command) in &self.entries {
            if pred(alias) && !out.iter().any(|seen| Arc::ptr_eq(seen, command)) {
                out.push(Arc::clone(command));
            }
        }
        out
    }

    fn first_where(&self, mut pred: impl FnMut(&str) -> bool) -> Option<SharedCommand<C>> {
        self.entries
            .iter()
            .find(|(alias, _)| pred(alias))
            .map(|(_, command)| Arc::clone(command))
    }

    fn best_match(&self, query: &str) -> Option<SharedCommand<C>> {
        if query.is_empty() {
            return None;
        }
        let query = query.to_lowercase();
        self.first_where(|alias| alias.to_lowercase() == query)
            .or_else(|| self.first_where(|alias| alias.to_lowercase().starts_with(&query)))
            .or_else(|| self.first_where(|alias| alias.to_lowercase().contains(&query)))
    }
}

fn read<C>(table: &RwLock<AliasTable<C>>) -> RwLockReadGuard<'_, AliasTable<C>> {
    table.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<C>(table: &RwLock<AliasTable<C>>) -> RwLockWriteGuard<'_, AliasTable<C>> {
    table.write().unwrap_or_else(PoisonError::into_inner)
}

/// Read-only, non-owning handle into a registry's live contents.
///
/// Once the registry is dropped every lookup through the view comes back empty.
pub struct RegistryView<C> {
    table: Weak<RwLock<AliasTable<C>>>,
}

impl<C> Clone for RegistryView<C> {
    fn clone(&self) -> Self {
        Self {
            table: Weak::clone(&self.table),
        }
    }
}

impl<C> RegistryView<C> {
    /// Whether the registry behind this view still exists.
    pub fn is_live(&self) -> bool {
        self.table.strong_count() > 0
    }

    pub fn get(&self, alias: &str) -> Option<SharedCommand<C>> {
        let table = self.table.upgrade()?;
        read(&table).get(alias)
    }

    /// Distinct registered commands, or `None` if the registry is gone.
    pub fn commands(&self) -> Option<Vec<SharedCommand<C>>> {
        let table = self.table.upgrade()?;
        Some(read(&table).distinct_where(|_| true))
    }
}

/// Registry holding every command by alias.
pub struct CommandRegistry<C> {
    table: Arc<RwLock<AliasTable<C>>>,
    help: SharedCommand<C>,
}

impl<C: 'static> CommandRegistry<C> {
    /// Registry with `commands` and the default help command.
    pub fn new<I>(commands: I) -> Self
    where
        I: IntoIterator<Item = SharedCommand<C>>,
    {
        Self::builder().commands(commands).build()
    }

    pub fn builder() -> CommandRegistryBuilder<C> {
        CommandRegistryBuilder {
            commands: Vec::new(),
            help: HelpSource::Default,
            theme: Theme::default(),
            output: None,
        }
    }

    /// Bind every alias of `command`. Existing bindings are silently replaced.
    pub fn register(&mut self, command: SharedCommand<C>) {
        write(&self.table).bind(&command);
    }

    pub fn register_all<I>(&mut self, commands: I)
    where
        I: IntoIterator<Item = SharedCommand<C>>,
    {
        let mut table = write(&self.table);
        for command in commands {
            table.bind(&command);
        }
    }

    /// Exact, case-sensitive alias lookup.
    pub fn get(&self, alias: &str) -> Option<SharedCommand<C>> {
        read(&self.table).get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        read(&self.table).index.contains_key(alias)
    }

    /// Each registered command once, in first-binding order.
    pub fn commands(&self) -> Vec<SharedCommand<C>> {
        read(&self.table).distinct_where(|_| true)
    }

    /// All bound aliases in iteration order.
    pub fn aliases(&self) -> Vec<String> {
        read(&self.table)
            .entries
            .iter()
            .map(|(alias, _)| alias.clone())
            .collect()
    }

    /// Number of distinct commands.
    pub fn len(&self) -> usize {
        self.commands().len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.table).entries.is_empty()
    }

    /// Distinct commands with an alias containing `fragment`, ignoring case.
    pub fn find_containing(&self, fragment: &str) -> Vec<SharedCommand<C>> {
        let fragment = fragment.to_lowercase();
        read(&self.table).distinct_where(|alias| alias.to_lowercase().contains(&fragment))
    }

    /// Most similar command for `query`, ignoring case.
    ///
    /// Exact alias matches beat prefix matches, which beat substring matches.
    /// Within a tier the alias bound first wins. An empty query matches nothing.
    pub fn find_best_match(&self, query: &str) -> Option<SharedCommand<C>> {
        read(&self.table).best_match(query)
    }

    /// The command registered as help.
    pub fn help_command(&self) -> &SharedCommand<C> {
        &self.help
    }

    /// A non-owning view into this registry.
    pub fn view(&self) -> RegistryView<C> {
        RegistryView {
            table: Arc::downgrade(&self.table),
        }
    }
}

enum HelpSource<C> {
    Default,
    Command(SharedCommand<C>),
    Factory(HelpFactory<C>),
}

/// Builder for [`CommandRegistry`].
pub struct CommandRegistryBuilder<C> {
    commands: Vec<SharedCommand<C>>,
    help: HelpSource<C>,
    theme: Theme,
    output: Option<Output>,
}

impl<C: 'static> CommandRegistryBuilder<C> {
    pub fn command(mut self, command: SharedCommand<C>) -> Self {
        self.commands.push(command);
        self
    }

    pub fn commands<I>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = SharedCommand<C>>,
    {
        self.commands.extend(commands);
        self
    }

    /// Use `help` instead of the default help command. Only its own aliases
    /// are bound.
    pub fn help(mut self, help: SharedCommand<C>) -> Self {
        self.help = HelpSource::Command(help);
        self
    }

    /// Build the help command from a view of the registry being constructed.
    pub fn help_with<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(RegistryView<C>) -> SharedCommand<C> + 'static,
    {
        self.help = HelpSource::Factory(Box::new(factory));
        self
    }

    /// Theme for the default help command.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Writer for the default help command. Defaults to stdout.
    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    pub fn build(self) -> CommandRegistry<C> {
        let table = Arc::new(RwLock::new(AliasTable::new()));
        let view = RegistryView {
            table: Arc::downgrade(&table),
        };

        let help: SharedCommand<C> = match self.help {
            HelpSource::Default => Arc::new(HelpCommand::new(
                view,
                self.theme,
                self.output.unwrap_or_else(stdout_output),
            )),
            HelpSource::Command(help) => help,
            HelpSource::Factory(factory) => factory(view),
        };

        {
            let mut table = write(&table);
            for command in &self.commands {
                table.bind(command);
            }
            table.bind(&help);
        }

        CommandRegistry { table, help }
    }
}

impl<C: 'static> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self::builder().build()
    }
}
