//! The accessibility-tree contract.
//!
//! Elements are handles into a tree owned by another process. Any call may
//! fail with [`Error::StaleElement`](crate::Error::StaleElement) if the UI
//! behind the handle has gone away, so callers treat every read as fallible.

use std::{fmt, sync::Arc};

use crate::{Rect, Result};

macro_rules! control_types {
    ( $( $variant:ident = $id:literal, )* ) => {
        /// UI Automation control type. Values are the `UIA_*ControlTypeId`
        /// constants.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[allow(missing_docs)]
        pub enum ControlType {
            $( $variant, )*
            /// Any id not listed above.
            Other(i32),
        }

        impl ControlType {
            /// Map a raw control type id.
            pub const fn from_id(id: i32) -> Self {
                match id {
                    $( $id => Self::$variant, )*
                    other => Self::Other(other),
                }
            }

            /// The raw control type id.
            pub const fn id(self) -> i32 {
                match self {
                    $( Self::$variant => $id, )*
                    Self::Other(id) => id,
                }
            }
        }
    };
}

control_types! {
    Button = 50000,
    Calendar = 50001,
    CheckBox = 50002,
    ComboBox = 50003,
    Edit = 50004,
    Hyperlink = 50005,
    Image = 50006,
    ListItem = 50007,
    List = 50008,
    Menu = 50009,
    MenuBar = 50010,
    MenuItem = 50011,
    ProgressBar = 50012,
    RadioButton = 50013,
    ScrollBar = 50014,
    Slider = 50015,
    Spinner = 50016,
    StatusBar = 50017,
    Tab = 50018,
    TabItem = 50019,
    Text = 50020,
    ToolBar = 50021,
    ToolTip = 50022,
    Tree = 50023,
    TreeItem = 50024,
    Custom = 50025,
    Group = 50026,
    Thumb = 50027,
    DataGrid = 50028,
    DataItem = 50029,
    Document = 50030,
    SplitButton = 50031,
    Window = 50032,
    Pane = 50033,
    Header = 50034,
    HeaderItem = 50035,
    Table = 50036,
    TitleBar = 50037,
    Separator = 50038,
}

/// One node of an accessibility tree.
pub trait UiElement: Send + Sync {
    /// Control type of this node.
    fn control_type(&self) -> Result<ControlType>;

    /// Accessible name, mostly for diagnostics.
    fn name(&self) -> Result<String>;

    /// True if the node is scrolled out of view or otherwise not on screen.
    fn is_offscreen(&self) -> Result<bool>;

    /// Bounding rectangle in screen device pixels.
    fn bounds(&self) -> Result<Rect>;

    /// First child in the tree's native order, or `None` for a leaf.
    fn first_child(&self) -> Result<Option<Element>>;

    /// Next sibling in the tree's native order, or `None` at the end.
    fn next_sibling(&self) -> Result<Option<Element>>;

    /// Whether the node exposes an invoke capability.
    fn can_invoke(&self) -> bool;

    /// Invoke the node's default action.
    fn invoke(&self) -> Result<()>;
}

/// Shared handle to an accessibility node.
pub type Element = Arc<dyn UiElement>;

/// Debug helper that renders an element as `ControlType "name"`, tolerating
/// stale handles.
pub struct Describe<'a>(pub &'a dyn UiElement);

impl fmt::Display for Describe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.control_type() {
            Ok(ct) => write!(f, "{:?}", ct)?,
            Err(_) => write!(f, "<stale>")?,
        }
        if let Ok(name) = self.0.name()
            && !name.is_empty()
        {
            write!(f, " {:?}", name)?;
        }
        Ok(())
    }
}
