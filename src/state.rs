use crate::config::Config;
use crate::model::{DesktopEntry, GroupedEntries};
use log::info;

pub struct AppState {
    pub config: Config,

    /// The grouped scan result. Replaced wholesale, exactly once per fetch.
    pub groups: GroupedEntries,

    /// True until the background scan has delivered its result.
    pub loading: bool,

    /// Flat index of the selected entry across all groups.
    pub selected: usize,

    /// Flat index of the entry shown in the detail panel, if any.
    pub detail: Option<usize>,

    /// Pixel scroll offset of the content area.
    pub scroll: f32,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            groups: GroupedEntries::new(),
            loading: true,
            selected: 0,
            detail: None,
            scroll: 0.0,
        }
    }

    /// The single hand-off point from the scan thread: the complete result
    /// lands in one assignment, never piecemeal.
    pub fn set_groups(&mut self, groups: GroupedEntries) {
        info!(
            "state: received {} groups, {} entries",
            groups.len(),
            groups.iter().map(|(_, entries)| entries.len()).sum::<usize>()
        );
        self.groups = groups;
        self.loading = false;
        self.selected = 0;
        self.detail = None;
        self.scroll = 0.0;
    }

    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|(_, entries)| entries.len()).sum()
    }

    /// Look up an entry by its flat index across groups.
    pub fn entry(&self, flat: usize) -> Option<&DesktopEntry> {
        let mut index = flat;
        for (_, entries) in &self.groups {
            if index < entries.len() {
                return entries.get(index);
            }
            index -= entries.len();
        }
        None
    }

    pub fn selected_entry(&self) -> Option<&DesktopEntry> {
        self.entry(self.selected)
    }

    /// Move the selection by `delta`, clamped to the valid range.
    pub fn move_selection(&mut self, delta: i32) {
        let count = self.entry_count();
        if count == 0 {
            self.selected = 0;
            return;
        }
        let target = self.selected as i32 + delta;
        self.selected = target.clamp(0, count as i32 - 1) as usize;
    }
}
