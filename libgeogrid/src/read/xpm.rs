//! XPM pixel map reader
//!
//! XPM is a C-source text format: a colour table maps fixed-width
//! character codes to colours (and optionally symbolic names), then one
//! quoted string per pixel row spells the image out of those codes.
//! Georeferencing rides along in the extension section as
//! `XPMEXT xllcorner|yllcorner|cellsize <value>` lines.
//!
//! A cell's value is the code's symbolic name when one is given, and the
//! code itself otherwise; fully transparent pixels leave their cells
//! unset. When every populated cell resolved to a legend colour, the
//! result is a keyed raster whose legend is the colour table.

use crate::color::Color;
use crate::error::Error;
use crate::grid::Grid;
use crate::key::MappedKey;
use crate::keyed::KeyedRaster;
use crate::raster::Raster;
use crate::read::scan::{CommentRules, Scanner};
use crate::read::ReadRaster;
use crate::xcolor::{self, XColorError};
use nom::bytes::complete::take;
use nom::combinator::{all_consuming, map_res};
use nom::sequence::tuple;
use nom::IResult;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use strum::{EnumString, IntoStaticStr};
use tracing::{debug, warn};

const FORMAT: &str = "XPM";
const C: CommentRules = CommentRules::C;

/// The per-code tags a colour table entry can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
enum ColorTag {
    /// Monochrome colour
    #[strum(serialize = "m")]
    Mono,
    /// Four-level greyscale colour
    #[strum(serialize = "g4")]
    Grey4,
    /// Greyscale colour
    #[strum(serialize = "g")]
    Grey,
    /// Full colour
    #[strum(serialize = "c")]
    Color,
    /// Symbolic name for the code
    #[strum(serialize = "s")]
    Symbol,
}

/// One colour table entry: the colours per rendering tag, and the
/// symbolic name if any
#[derive(Debug, Clone, Default)]
struct ColorEntry {
    mono: Option<Color>,
    grey4: Option<Color>,
    grey: Option<Color>,
    color: Option<Color>,
    symbol: Option<String>,
}

impl ColorEntry {
    /// The best colour for rendering: colour beats grey beats four-level
    /// grey beats monochrome
    fn best_color(&self) -> Option<Color> {
        self.color.or(self.grey).or(self.grey4).or(self.mono)
    }
}

/// Reads an XPM file
///
/// # Errors
/// Fails if the file cannot be opened or does not conform to the format.
pub fn read_xpm(path: impl AsRef<Path>) -> Result<ReadRaster, Error> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    read_xpm_from_reader(reader, &path.display().to_string())
}

/// Reads an XPM pixel map from a buffered reader
///
/// # Errors
/// Fails on any deviation from the XPM grammar: a malformed preamble or
/// header, an unparseable colour table entry, a pixel row of the wrong
/// length, a code not in the colour table, or a bad extension value.
pub fn read_xpm_from_reader(reader: impl BufRead, filename: &str) -> Result<ReadRaster, Error> {
    let mut scanner = Scanner::new(reader, filename, FORMAT);

    scanner.expect_literal("/* XPM */", false, false)?;
    scanner.expect_word("static", C, false)?;
    scanner.expect_literal("char", false, true)?;
    scanner.expect_literal("*", false, true)?;
    scanner.read_word_delimited(C, &['[', '='], "an array name")?;
    scanner.expect_literal("[", false, true)?;
    scanner.expect_literal("]", false, true)?;
    scanner.expect_literal("=", false, true)?;
    scanner.expect_word("{", C, false)?;

    let header = Header::parse(&mut scanner)?;
    scanner.expect_literal(",", false, false)?;

    let table = read_color_table(&mut scanner, &header)?;
    let (grid, used, all_have_colors) = read_pixels(&mut scanner, &header, &table)?;
    let georef = read_extensions(&mut scanner, header.extensions)?;

    let legend: Vec<(String, Color)> = table
        .iter()
        .filter(|(code, _)| used.contains(code))
        .filter_map(|(code, entry)| {
            let color = entry.best_color().filter(|c| !c.is_transparent())?;
            Some((entry.symbol.clone().unwrap_or_else(|| code.clone()), color))
        })
        .collect();
    let promote = all_have_colors && !legend.is_empty();

    let raster = if let Ok(cells) = grid.parse_as::<i32>() {
        match keyed_or_plain(cells, &legend, promote, georef)? {
            (raster, Some(key)) => ReadRaster::KeyedInt(KeyedRaster::new(raster, key)),
            (raster, None) => ReadRaster::Int(raster),
        }
    } else if let Ok(cells) = grid.parse_as::<f64>() {
        match keyed_or_plain(cells, &legend, promote, georef)? {
            (raster, Some(key)) => ReadRaster::KeyedDouble(KeyedRaster::new(raster, key)),
            (raster, None) => ReadRaster::Double(raster),
        }
    } else {
        match keyed_or_plain(grid, &legend, promote, georef)? {
            (raster, Some(key)) => ReadRaster::KeyedText(KeyedRaster::new(raster, key)),
            (raster, None) => ReadRaster::Text(raster),
        }
    };

    debug!(
        "read {}x{} {} raster from {filename}, keyed: {}",
        raster.rows(),
        raster.cols(),
        raster.cell_type(),
        raster.is_keyed()
    );
    Ok(raster)
}

/// The parsed XPM header string
struct Header {
    width: usize,
    height: usize,
    ncolors: usize,
    chars_per_color: usize,
    extensions: bool,
}

impl Header {
    const SHAPE: &'static str =
        "<width> <height> <ncolours> <nchrspcolour> [<x hotspot> <y hotspot>] [XPMEXT]";

    fn parse(scanner: &mut Scanner<impl BufRead>) -> Result<Self, Error> {
        let text = scanner.read_quoted(C, '"', '"')?;
        let words: Vec<&str> = text.split_whitespace().collect();
        let extensions = words.len() > 4 && words.last() == Some(&"XPMEXT");
        let numbers = if extensions {
            &words[..words.len() - 1]
        } else {
            &words[..]
        };
        if numbers.len() != 4 && numbers.len() != 6 {
            return Err(scanner.refuse(Self::SHAPE, Some(text.clone())).into());
        }
        let int = |word: &str, what: &str| -> Result<usize, Error> {
            word.parse()
                .map_err(|_| {
                    scanner
                        .refuse(format!("an integer for {what}"), Some(word.to_owned()))
                        .into()
                })
        };
        let header = Self {
            width: int(numbers[0], "width")?,
            height: int(numbers[1], "height")?,
            ncolors: int(numbers[2], "number of colours")?,
            chars_per_color: int(numbers[3], "number of characters per colour")?,
            extensions,
        };
        if numbers.len() == 6 {
            int(numbers[4], "x hotspot")?;
            int(numbers[5], "y hotspot")?;
        }
        if header.chars_per_color == 0 {
            return Err(scanner
                .refuse("at least one character per colour", Some(text))
                .into());
        }
        Ok(header)
    }
}

fn read_color_table(
    scanner: &mut Scanner<impl BufRead>,
    header: &Header,
) -> Result<Vec<(String, ColorEntry)>, Error> {
    let mut table: Vec<(String, ColorEntry)> = Vec::with_capacity(header.ncolors);
    for _ in 0..header.ncolors {
        let line = scanner.read_quoted(C, '"', '"')?;
        let chars: Vec<char> = line.chars().collect();
        if chars.len() < header.chars_per_color + 1 {
            return Err(scanner.refuse("colour map", Some(line)).into());
        }
        let code: String = chars[..header.chars_per_color].iter().collect();
        let rest: String = chars[header.chars_per_color..].iter().collect();
        let entry = parse_color_entry(scanner, &rest)?;
        match table.iter_mut().find(|(bound, _)| *bound == code) {
            Some((_, existing)) => *existing = entry,
            None => table.push((code, entry)),
        }
        scanner.expect_literal(",", false, false)?;
    }
    Ok(table)
}

/// Parses the tagged section of a colour table entry
///
/// Values run from their tag to the next tag, so multi-word X colour
/// names ("navy blue") stay intact.
fn parse_color_entry(
    scanner: &Scanner<impl BufRead>,
    text: &str,
) -> Result<ColorEntry, Error> {
    let mut sections: Vec<(ColorTag, Vec<&str>)> = Vec::new();
    for word in text.split_whitespace() {
        match ColorTag::from_str(word) {
            Ok(tag) => sections.push((tag, Vec::new())),
            Err(_) => match sections.last_mut() {
                Some((_, value)) => value.push(word),
                None => {
                    return Err(scanner
                        .refuse("\"m\", \"g4\", \"g\", \"c\" or \"s\"", Some(word.to_owned()))
                        .into())
                }
            },
        }
    }
    let mut entry = ColorEntry::default();
    for (tag, value) in sections {
        if value.is_empty() {
            let tag_name: &'static str = tag.into();
            return Err(scanner
                .refuse(format!("colour name for key \"{tag_name}\""), None)
                .into());
        }
        let value = value.join(" ");
        match tag {
            ColorTag::Symbol => entry.symbol = Some(value),
            ColorTag::Mono => entry.mono = Some(parse_color_literal(scanner, &value)?),
            ColorTag::Grey4 => entry.grey4 = Some(parse_color_literal(scanner, &value)?),
            ColorTag::Grey => entry.grey = Some(parse_color_literal(scanner, &value)?),
            ColorTag::Color => entry.color = Some(parse_color_literal(scanner, &value)?),
        }
    }
    Ok(entry)
}

fn hex_channel(digits: usize) -> impl FnMut(&str) -> IResult<&str, u32> {
    move |input| map_res(take(digits), |s: &str| u32::from_str_radix(s, 16))(input)
}

fn hex_triplet(input: &str, digits: usize) -> IResult<&str, (u32, u32, u32)> {
    all_consuming(tuple((
        hex_channel(digits),
        hex_channel(digits),
        hex_channel(digits),
    )))(input)
}

/// Decodes one colour literal from the colour table
///
/// `None` is fully transparent; `#` starts a hexadecimal RGB triplet and
/// `%` a hexadecimal HSB one, each channel normalised by the largest
/// value its digits can spell; anything else is an X colour name.
fn parse_color_literal(
    scanner: &Scanner<impl BufRead>,
    literal: &str,
) -> Result<Color, Error> {
    if literal == "None" {
        return Ok(Color::TRANSPARENT);
    }
    if let Some(hex) = literal.strip_prefix('#') {
        let (r, g, b) = decode_triplet(hex).ok_or_else(|| {
            scanner.refuse(
                "a hexadecimal colour in format #RnGnBn",
                Some(literal.to_owned()),
            )
        })?;
        return Ok(Color::from_rgb_f32(r, g, b));
    }
    if let Some(hex) = literal.strip_prefix('%') {
        let (h, s, b) = decode_triplet(hex).ok_or_else(|| {
            scanner.refuse(
                "a hexadecimal colour in format %HnSnBn",
                Some(literal.to_owned()),
            )
        })?;
        return Ok(Color::from_hsb(h, s, b));
    }
    xcolor::lookup(literal).map_err(|e| match e {
        XColorError::Unavailable(_) => scanner.refuse(e.to_string(), None).into(),
        XColorError::UnknownName(name) => scanner
            .refuse(
                "the word \"None\", an RGB colour as #RnGnBn, an HSB colour \
                 as %HnSnBn, or the name of an X standard colour",
                Some(name),
            )
            .into(),
    })
}

/// Splits `3n` hex digits into three channels normalised to `[0, 1]`
fn decode_triplet(hex: &str) -> Option<(f32, f32, f32)> {
    if hex.len() % 3 != 0 || hex.is_empty() {
        return None;
    }
    let digits = hex.len() / 3;
    let (_, (a, b, c)) = hex_triplet(hex, digits).ok()?;
    let denominator = (2.0f32).powi(4 * digits as i32) - 1.0;
    Some((
        a as f32 / denominator,
        b as f32 / denominator,
        c as f32 / denominator,
    ))
}

type Pixels = (Grid<String>, HashSet<String>, bool);

fn read_pixels(
    scanner: &mut Scanner<impl BufRead>,
    header: &Header,
    table: &[(String, ColorEntry)],
) -> Result<Pixels, Error> {
    let cpc = header.chars_per_color;
    let mut grid = Grid::new(header.height, header.width);
    let mut used = HashSet::new();
    let mut all_have_colors = true;
    for y in 0..header.height {
        let row = scanner.read_quoted(C, '"', '"')?;
        let chars: Vec<char> = row.chars().collect();
        if chars.len() != header.width * cpc {
            return Err(scanner
                .refuse(
                    format!(
                        "{} pixels * {cpc} characters each = {} character quoted string",
                        header.width,
                        header.width * cpc
                    ),
                    Some(row),
                )
                .into());
        }
        for x in 0..header.width {
            let code: String = chars[x * cpc..(x + 1) * cpc].iter().collect();
            let Some((_, entry)) = table.iter().find(|(bound, _)| *bound == code) else {
                return Err(scanner
                    .refuse(format!("a valid colour for ({x}, {y})"), Some(code))
                    .into());
            };
            match (entry.best_color(), entry.symbol.as_ref()) {
                (Some(color), _) if color.is_transparent() => {}
                (Some(_), symbol) => {
                    let value = symbol.cloned().unwrap_or_else(|| code.clone());
                    grid.set_rc(y, x, Some(value))?;
                    used.insert(code);
                }
                (None, Some(symbol)) => {
                    grid.set_rc(y, x, Some(symbol.clone()))?;
                    all_have_colors = false;
                }
                (None, None) => {
                    return Err(scanner
                        .refuse(format!("a valid colour for ({x}, {y})"), Some(code))
                        .into());
                }
            }
        }
        if y + 1 < header.height {
            scanner.expect_literal(",", false, false)?;
        }
    }
    Ok((grid, used, all_have_colors))
}

/// Georeferencing gathered from the extension section
struct GeoRef {
    xllcorner: f64,
    yllcorner: f64,
    cellsize: f64,
}

impl Default for GeoRef {
    fn default() -> Self {
        Self {
            xllcorner: 0.0,
            yllcorner: 0.0,
            cellsize: 1.0,
        }
    }
}

fn read_extensions(
    scanner: &mut Scanner<impl BufRead>,
    declared: bool,
) -> Result<GeoRef, Error> {
    let mut georef = GeoRef::default();
    if !declared {
        return Ok(georef);
    }
    scanner.expect_literal(",", false, false)?;
    while scanner.peek_char(C)? == Some('"') {
        let extension = scanner.read_quoted(C, '"', '"')?;
        if extension == "XPMENDEXT" {
            break;
        }
        let words: Vec<&str> = extension.split_whitespace().collect();
        if words.len() == 3 && words[0] == "XPMEXT" {
            let double_for = |key: &str, token: &str| -> Result<f64, Error> {
                token.parse().map_err(|_| {
                    scanner
                        .refuse(
                            format!("a valid double precision floating point number for {key}"),
                            Some(token.to_owned()),
                        )
                        .into()
                })
            };
            match words[1] {
                "xllcorner" => georef.xllcorner = double_for(words[1], words[2])?,
                "yllcorner" => georef.yllcorner = double_for(words[1], words[2])?,
                "cellsize" => georef.cellsize = double_for(words[1], words[2])?,
                _ => {}
            }
        }
        if scanner.peek_char(C)? == Some(',') {
            scanner.expect_literal(",", false, false)?;
        }
    }
    Ok(georef)
}

/// Builds the raster, promoting it to a keyed one when the legend covers
/// every populated cell
fn keyed_or_plain<T>(
    cells: Grid<T>,
    legend: &[(String, Color)],
    promote: bool,
    georef: GeoRef,
) -> Result<(Raster<T>, Option<MappedKey<T>>), Error>
where
    T: FromStr + PartialEq + Clone + std::fmt::Display,
{
    let raster = Raster::from_grid(
        cells,
        georef.xllcorner,
        georef.yllcorner,
        georef.cellsize,
        None,
    )?;
    if !promote {
        return Ok((raster, None));
    }
    let pairs: Option<Vec<(T, Color)>> = legend
        .iter()
        .map(|(value, color)| value.parse().ok().map(|parsed| (parsed, *color)))
        .collect();
    let Some(pairs) = pairs else {
        return Ok((raster, None));
    };
    match MappedKey::from_pairs(pairs) {
        Ok(key) => Ok((raster, Some(key))),
        Err(e) => {
            warn!("legend is not one-to-one ({e}); keeping the raster unkeyed");
            Ok((raster, None))
        }
    }
}
