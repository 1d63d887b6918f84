// Declared schema: one descriptor per record field, fixed for a session.

use crate::core::TextChar;
use crate::error::Result;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Bit width of an integer target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    #[inline]
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    /// Width matching `usize`/`isize` on this target
    pub fn pointer() -> Self {
        match usize::BITS {
            16 => IntWidth::W16,
            32 => IntWidth::W32,
            _ => IntWidth::W64,
        }
    }
}

/// Precision of a real target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealWidth {
    F32,
    F64,
}

/// User-supplied conversion between a cell and an arbitrary value.
///
/// Opaque to the tokenizer; only `from_cell` is called while parsing.
pub trait CellConverter<C: TextChar>: Send + Sync {
    fn from_cell(&self, cell: &[C]) -> Result<Box<dyn Any + Send>>;

    fn to_cell(&self, value: &dyn Any, out: &mut Vec<C>) -> Result<()>;
}

/// [`CellConverter`] built from a pair of closures.
pub struct FnConverter<F, G> {
    from: F,
    to: G,
}

impl<F, G> FnConverter<F, G> {
    pub fn new(from: F, to: G) -> Self {
        FnConverter { from, to }
    }
}

impl<C, T, F, G> CellConverter<C> for FnConverter<F, G>
where
    C: TextChar,
    T: Any + Send,
    F: Fn(&[C]) -> Result<T> + Send + Sync,
    G: Fn(&T, &mut Vec<C>) -> Result<()> + Send + Sync,
{
    fn from_cell(&self, cell: &[C]) -> Result<Box<dyn Any + Send>> {
        Ok(Box::new((self.from)(cell)?))
    }

    fn to_cell(&self, value: &dyn Any, out: &mut Vec<C>) -> Result<()> {
        match value.downcast_ref::<T>() {
            Some(v) => (self.to)(v, out),
            None => Err(crate::error::TableError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                found: "another custom type",
            }),
        }
    }
}

/// How a cell is decoded. A closed set; decoding dispatches on it.
#[derive(Clone)]
pub enum ColumnKind<C: TextChar = u8> {
    /// Borrow the span as-is, quotes and escapes untouched
    RawString,
    /// Copy into a `String`, undoing doubled quotes and escapes
    OwnedString,
    Unsigned(IntWidth),
    Signed(IntWidth),
    Real(RealWidth),
    Custom(Arc<dyn CellConverter<C>>),
    /// Consumed for alignment, value discarded
    Ignored,
}

impl<C: TextChar> ColumnKind<C> {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::RawString => "raw string",
            ColumnKind::OwnedString => "string",
            ColumnKind::Unsigned(_) => "unsigned integer",
            ColumnKind::Signed(_) => "signed integer",
            ColumnKind::Real(_) => "real",
            ColumnKind::Custom(_) => "custom",
            ColumnKind::Ignored => "ignored",
        }
    }
}

impl<C: TextChar> fmt::Debug for ColumnKind<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Unsigned(w) => write!(f, "Unsigned({:?})", w),
            ColumnKind::Signed(w) => write!(f, "Signed({:?})", w),
            ColumnKind::Real(w) => write!(f, "Real({:?})", w),
            ColumnKind::Custom(_) => f.write_str("Custom(..)"),
            ColumnKind::RawString => f.write_str("RawString"),
            ColumnKind::OwnedString => f.write_str("OwnedString"),
            ColumnKind::Ignored => f.write_str("Ignored"),
        }
    }
}

/// Rust numeric types usable as column targets
pub trait NumberColumn {
    fn kind<C: TextChar>() -> ColumnKind<C>;
}

macro_rules! number_column {
    ($($t:ty => $kind:expr),* $(,)?) => {
        $(
            impl NumberColumn for $t {
                fn kind<C: TextChar>() -> ColumnKind<C> {
                    $kind
                }
            }
        )*
    };
}

number_column! {
    u8 => ColumnKind::Unsigned(IntWidth::W8),
    u16 => ColumnKind::Unsigned(IntWidth::W16),
    u32 => ColumnKind::Unsigned(IntWidth::W32),
    u64 => ColumnKind::Unsigned(IntWidth::W64),
    usize => ColumnKind::Unsigned(IntWidth::pointer()),
    i8 => ColumnKind::Signed(IntWidth::W8),
    i16 => ColumnKind::Signed(IntWidth::W16),
    i32 => ColumnKind::Signed(IntWidth::W32),
    i64 => ColumnKind::Signed(IntWidth::W64),
    isize => ColumnKind::Signed(IntWidth::pointer()),
    f32 => ColumnKind::Real(RealWidth::F32),
    f64 => ColumnKind::Real(RealWidth::F64),
}

/// One declared column
#[derive(Debug, Clone)]
pub struct ColumnDescriptor<C: TextChar = u8> {
    /// Header text to match, `None` for positional columns
    pub name: Option<String>,
    pub kind: ColumnKind<C>,
    /// Fail instead of truncating when an integer does not fit its width
    pub range_check: bool,
    /// Physical column for an unnamed descriptor. Defaults to the
    /// descriptor's declared index.
    pub position: Option<usize>,
}

impl<C: TextChar> ColumnDescriptor<C> {
    pub fn new(name: impl Into<String>, kind: ColumnKind<C>) -> Self {
        ColumnDescriptor {
            name: Some(name.into()),
            kind,
            range_check: false,
            position: None,
        }
    }

    pub fn unnamed(kind: ColumnKind<C>) -> Self {
        ColumnDescriptor {
            name: None,
            kind,
            range_check: false,
            position: None,
        }
    }

    pub fn raw(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::RawString)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::OwnedString)
    }

    /// Numeric column whose kind and width follow `T`
    pub fn number<T: NumberColumn>(name: impl Into<String>) -> Self {
        Self::new(name, T::kind())
    }

    pub fn custom(name: impl Into<String>, converter: impl CellConverter<C> + 'static) -> Self {
        Self::new(name, ColumnKind::Custom(Arc::new(converter)))
    }

    pub fn ignored(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Ignored)
    }

    pub fn with_range_check(mut self) -> Self {
        self.range_check = true;
        self
    }

    /// Read this unnamed column from physical column `index`
    pub fn at(mut self, index: usize) -> Self {
        self.position = Some(index);
        self
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

/// Ordered list of column descriptors
#[derive(Debug, Clone, Default)]
pub struct Schema<C: TextChar = u8> {
    columns: Vec<ColumnDescriptor<C>>,
}

impl<C: TextChar> Schema<C> {
    pub fn new() -> Self {
        Schema {
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, descriptor: ColumnDescriptor<C>) -> Self {
        self.columns.push(descriptor);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&ColumnDescriptor<C>> {
        self.columns.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDescriptor<C>> {
        self.columns.iter()
    }

    pub fn named_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_named()).count()
    }
}

impl<C: TextChar> FromIterator<ColumnDescriptor<C>> for Schema<C> {
    fn from_iter<I: IntoIterator<Item = ColumnDescriptor<C>>>(iter: I) -> Self {
        Schema {
            columns: iter.into_iter().collect(),
        }
    }
}
