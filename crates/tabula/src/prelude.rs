//! Prelude module - common imports for tabula users
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellError,
    CellType,
    CellValue,
    // Style types
    Color,
    DateFormatStyle,
    // Pipeline
    Document,
    // Error types
    Error,
    ErrorKind,
    FileType,
    FileTypeRegistry,
    HorizontalAlignment,
    IoOptions,
    NumberFormat,
    Progress,
    Region,
    Result,
    Sheet,
    StreamingXlsxWorkbook,
    Style,
    VerticalAlignment,
    // Main types
    Workbook,
    // Extension traits
    WorkbookExt,
};
