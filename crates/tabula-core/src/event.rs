//! Workbook change notifications

/// A structural change to a workbook
///
/// Listeners registered with [`Workbook::subscribe`](crate::Workbook::subscribe)
/// receive events synchronously, in the order the mutations happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbookEvent {
    SheetAdded { index: usize, name: String },
    SheetRemoved { index: usize, name: String },
    /// The current sheet changed; `None` when the workbook has no sheets left
    ActiveSheetChanged {
        old: Option<usize>,
        new: Option<usize>,
    },
}

/// Boxed workbook listener
pub type Listener = Box<dyn FnMut(&WorkbookEvent) + Send + Sync>;
