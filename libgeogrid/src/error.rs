use thiserror::Error;

/// Possible `libgeogrid` errors
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error returned when an underlying read fails
    #[error("i/o error")]
    Io(#[from] std::io::Error),
    /// Error returned on out-of-bounds grid access
    #[error(transparent)]
    Index(#[from] IndexError),
    /// Error returned when a cell cannot be coerced to the requested type
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Error returned when a file does not conform to its declared format
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Error returned when a colour key cannot convert a value or colour
    #[error(transparent)]
    Key(#[from] KeyError),
    /// Error returned when a scale cannot be built
    #[error(transparent)]
    Scale(#[from] ScaleError),
    /// Error returned when two scale ranges overlap
    #[error(transparent)]
    Overlap(#[from] OverlapError),
    /// Error returned when a mapped key would stop being one-to-one
    #[error(transparent)]
    Mapping(#[from] MappingError),
    /// Error returned for a zero or negative cell size
    #[error(transparent)]
    CellSize(#[from] CellSizeError),
}

/// Out-of-bounds access to a grid cell
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("index out of bounds: ({row}, {col}) in grid of size ({rows}, {cols})")]
pub struct IndexError {
    /// Requested row
    pub row: usize,
    /// Requested column
    pub col: usize,
    /// Number of rows in the grid
    pub rows: usize,
    /// Number of columns in the grid
    pub cols: usize,
}

/// A cell entry that could not be coerced to the requested type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cell ({row}, {col}) holds {token:?}, which does not parse as {target}")]
pub struct ParseError {
    /// Row of the offending cell
    pub row: usize,
    /// Column of the offending cell
    pub col: usize,
    /// The token that failed to parse
    pub token: String,
    /// Name of the requested type
    pub target: &'static str,
}

/// A file that does not conform to its declared grammar
///
/// Carries the file name, the format it was expected to conform to, a
/// description of the expected construct and what was actually found.
/// `found` of [`None`] means the file ended early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// Name of the offending file
    pub filename: String,
    /// The format the file was declared to be in
    pub format: &'static str,
    /// Description of the expected construct
    pub expected: String,
    /// What was actually found, or [`None`] at end of file
    pub found: Option<String>,
    /// Line number where parsing stopped, if known
    pub line: Option<usize>,
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "file {} does not conform to format {}",
            self.filename, self.format
        )?;
        if let Some(line) = self.line {
            write!(f, " at line {line}")?;
        }
        write!(f, ": expecting {}, found ", self.expected)?;
        match &self.found {
            Some(found) => write!(f, "\"{found}\""),
            None => write!(f, "end of file"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Reasons a colour key can fail to convert a value or a colour
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum KeyError {
    /// The value lies outside the range of every scale asked
    #[error("scale {key} does not contain entry {entry}")]
    OutOfRange {
        /// The rejected entry
        entry: String,
        /// Description of the key that rejected it
        key: String,
    },
    /// A colour component lies outside the band spanned by the scale endpoints
    #[error("colour {components:?} is not within range {min:?} to {max:?}")]
    ColorOutOfRange {
        /// Components of the rejected colour
        components: [f32; 3],
        /// Components at the scale minimum
        min: [f32; 3],
        /// Components at the scale maximum
        max: [f32; 3],
    },
    /// Colour components disagree about the scale position
    #[error("colour {components:?} is not on a line between {min:?} and {max:?}")]
    NotOnLine {
        /// Components of the rejected colour
        components: [f32; 3],
        /// Components at the scale minimum
        min: [f32; 3],
        /// Components at the scale maximum
        max: [f32; 3],
    },
    /// More than one scale decoded the colour to different values
    #[error("ambiguous value for colour {color}: {first_key} gives {first}, {second_key} gives {second}")]
    Ambiguous {
        /// The ambiguous colour
        color: String,
        /// First decoded value
        first: String,
        /// Key that produced the first value
        first_key: String,
        /// Second, disagreeing value
        second: String,
        /// Key that produced the second value
        second_key: String,
    },
    /// The key holds no colour for this entry
    #[error("key {key} does not contain entry {entry}")]
    UnknownEntry {
        /// The unmapped entry
        entry: String,
        /// Description of the key
        key: String,
    },
    /// The key holds no entry for this colour
    #[error("key {key} does not contain colour {color}")]
    UnknownColor {
        /// The unmapped colour
        color: String,
        /// Description of the key
        key: String,
    },
}

/// Reasons a scaled key cannot be built
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScaleError {
    /// The scale endpoint does not linearise to a finite number
    #[error("cannot place {value} on the scale: linearised form is not finite")]
    NonFinite {
        /// The offending endpoint
        value: String,
    },
    /// The maximum does not linearise strictly above the minimum
    #[error("{max} converts to {max_linear}, which is less than or equal to {min_linear} converted from {min}")]
    EmptyRange {
        /// Declared minimum
        min: String,
        /// Declared maximum
        max: String,
        /// Linearised minimum
        min_linear: f64,
        /// Linearised maximum
        max_linear: f64,
    },
    /// Equal endpoint colours span no line through colour space
    #[error("colour {0} is used at both ends, and so does not form a scale")]
    EqualColors(String),
}

/// Two scale ranges that are not strictly ordered
#[derive(Error, Debug, Clone, PartialEq)]
#[error("scale {scale} cannot be inserted next to {neighbour}, because there are overlapping minima and maxima")]
pub struct OverlapError {
    /// Description of the scale that was being inserted
    pub scale: String,
    /// Description of the neighbour it clashed with
    pub neighbour: String,
}

/// A (colour, entry) pair that would break a one-to-one mapping
#[derive(Error, Debug, Clone, PartialEq)]
#[error("not a one-to-one mapping from colour to entry ({color} <-> {entry}); one side is already bound")]
pub struct MappingError {
    /// The colour being inserted
    pub color: String,
    /// The entry being inserted
    pub entry: String,
}

/// A zero or negative raster cell size
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("cell size must be strictly positive, got {0}")]
pub struct CellSizeError(pub f64);
