//! Update command: complete or delete entries of one list.

use anyhow::{Context, Result};
use gtd_core::{Collector, ListSelector, MaintenanceEngine, Workspace};

use crate::backend::Backends;

/// Loads every list, runs the maintenance loop on `selector`, then saves.
pub fn run(
    collector: &mut dyn Collector,
    selector: ListSelector,
    backends: &Backends,
) -> Result<()> {
    let sync = backends.sync();
    let mut workspace = Workspace::new();
    sync.import(&mut workspace).context("failed to load lists")?;

    let (list, completed) = workspace.maintained(selector);
    let summary = MaintenanceEngine::new()
        .run(list, completed, collector)
        .context("list update aborted")?;
    tracing::info!(
        list = %selector.kind(),
        completed = summary.completed,
        trashed = summary.trashed,
        "list updated"
    );

    sync.export(&workspace).context("failed to save lists")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use gtd_core::ScriptedCollector;

    use crate::Config;

    fn backends(dir: &std::path::Path) -> Backends {
        let mut config = Config::default();
        config.remote.database_path = dir.join("gtd.db");
        Backends::open(&config).unwrap()
    }

    #[test]
    fn completed_entry_is_saved() {
        let temp = tempfile::tempdir().unwrap();
        let backends = backends(temp.path());
        let mut workspace = Workspace::new();
        workspace.inbox.add("Buy milk");
        workspace.inbox.add("Call mom");
        backends.sync().export(&workspace).unwrap();

        let mut collector = ScriptedCollector::new(["0d", "q"]);
        run(&mut collector, ListSelector::Inbox, &backends).unwrap();

        let mut saved = Workspace::new();
        backends.sync().import(&mut saved).unwrap();
        let inbox: Vec<_> = saved.inbox.iter().map(|(_, item)| item.text.clone()).collect();
        assert_eq!(inbox, ["Call mom"]);
        assert_eq!(saved.completed_items.len(), 1);
        assert!(collector.showed("Goodbye!"));
    }

    #[test]
    fn closed_input_does_not_save() {
        let temp = tempfile::tempdir().unwrap();
        let backends = backends(temp.path());
        let mut workspace = Workspace::new();
        workspace.inbox.add("Buy milk");
        backends.sync().export(&workspace).unwrap();

        let mut collector = ScriptedCollector::new(["0d"]);
        let err = run(&mut collector, ListSelector::Inbox, &backends).unwrap_err();
        assert!(err.to_string().contains("list update aborted"));

        let mut saved = Workspace::new();
        backends.sync().import(&mut saved).unwrap();
        assert_eq!(saved.inbox.len(), 1);
        assert!(saved.completed_items.is_empty());
    }
}
