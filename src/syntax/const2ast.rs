// Copyright (c) 2016-2021 Fabian Schuiki

//! Conversion of integer literals into constant nodes.
//!
//! The parser reassembles a literal from its tokens (`8`, `'sh`, `ff`) into a
//! single string such as `8'shff` and hands it to `const2ast`, which produces
//! the bit vector of the constant.

use crate::ast::{AstNode, Bit, NodeFlags};
use num::{BigUint, Num};
use svfront_common::source::Span;

/// The kind of case statement a literal appears in. Determines whether `x`
/// and `z` digits are turned into don't-care bits.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CaseType {
    Normal,
    CaseX,
    CaseZ,
}

/// Why a literal could not be converted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConvError {
    /// Digits beyond the base, a size of zero, or no digits at all.
    Malformed,
    /// The size prefix exceeds `MAX_LITERAL_WIDTH`.
    TooWide,
}

/// The widest sized literal accepted, in bits.
pub const MAX_LITERAL_WIDTH: usize = 1 << 24;

const DIGIT_X: u8 = 0xf0;
const DIGIT_Z: u8 = 0xf1;

/// Convert an integer literal into a constant node.
pub fn const2ast(code: &str, case_type: CaseType, span: Span) -> Result<AstNode, ConvError> {
    use ConvError::*;

    let code: String = code
        .chars()
        .filter(|c| !matches!(c, '_' | ' ' | '\t' | '\r' | '\n'))
        .collect();
    let split = code
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(code.len());
    let (size, rest) = code.split_at(split);

    // Plain decimal numbers.
    if rest.is_empty() {
        if size.is_empty() {
            return Err(Malformed);
        }
        let mut bits = strtobin(size, None, 10, case_type)?;
        if bits.last() == Some(&Bit::S1) {
            bits.push(Bit::S0);
        }
        return Ok(AstNode::mkconst_bits(bits, true, span));
    }

    // The size is all digits, so a failed parse means it overflows.
    let size = if size.is_empty() {
        None
    } else {
        match size.parse::<usize>() {
            Ok(n) if n <= MAX_LITERAL_WIDTH => Some(n),
            _ => return Err(TooWide),
        }
    };
    let rest = rest.strip_prefix('\'').ok_or(Malformed)?;
    let (signed, rest) = match rest.strip_prefix(|c| c == 's' || c == 'S') {
        Some(r) => (true, r),
        None => (false, rest),
    };
    let mut chars = rest.chars();
    let base = match chars.next().ok_or(Malformed)?.to_ascii_lowercase() {
        'b' => 2,
        'o' => 8,
        'd' => 10,
        'h' => 16,
        c @ '0' | c @ '1' | c @ 'x' | c @ 'z' if rest.len() == 1 => {
            let bit = match c {
                '0' => Bit::S0,
                '1' => Bit::S1,
                'x' => Bit::Sx,
                _ => Bit::Sz,
            };
            let mut node = AstNode::mkconst_bits(vec![bit], signed, span);
            node.flags |= NodeFlags::UNSIZED;
            return Ok(node);
        }
        _ => return Err(Malformed),
    };

    let mut bits = strtobin(chars.as_str(), size, base, case_type)?;
    if size.is_none() && signed && bits.last() == Some(&Bit::S1) {
        bits.push(Bit::S0);
    }
    let mut node = AstNode::mkconst_bits(bits, signed, span);
    if size.is_none() {
        node.flags |= NodeFlags::UNSIZED;
    }
    Ok(node)
}

/// Expand the digits of a literal into bits, least significant first.
///
/// Without a size the result is extended to at least 32 bits. With a size it
/// is extended or truncated to exactly that width. Extension uses the top
/// bit if it is `x` or `z`, and zero otherwise.
fn strtobin(
    text: &str,
    size: Option<usize>,
    base: u32,
    case_type: CaseType,
) -> Result<Vec<Bit>, ConvError> {
    use ConvError::Malformed;
    let mut digits = Vec::with_capacity(text.len());
    for c in text.chars() {
        digits.push(match c {
            '0'..='9' => c as u8 - b'0',
            'a'..='f' => c as u8 - b'a' + 10,
            'A'..='F' => c as u8 - b'A' + 10,
            'x' | 'X' => DIGIT_X,
            'z' | 'Z' | '?' => DIGIT_Z,
            _ => return Err(Malformed),
        });
    }
    if digits.is_empty() {
        return Err(Malformed);
    }

    // A lone `x` or `z` decimal digit fills the whole constant.
    let base = if base == 10 && digits.len() == 1 && digits[0] >= DIGIT_X {
        2
    } else {
        base
    };

    let mut bits = Vec::new();
    if base == 10 {
        if digits.iter().any(|&d| d >= 10) {
            return Err(Malformed);
        }
        let value = BigUint::from_str_radix(text, 10).map_err(|_| Malformed)?;
        bits.extend(
            value
                .to_radix_le(2)
                .into_iter()
                .map(|b| if b != 0 { Bit::S1 } else { Bit::S0 }),
        );
    } else {
        let bits_per_digit = match base {
            2 => 1,
            8 => 3,
            _ => 4,
        };
        for &digit in digits.iter().rev() {
            if digit >= base as u8 && digit < DIGIT_X {
                return Err(Malformed);
            }
            for i in 0..bits_per_digit {
                bits.push(match digit {
                    DIGIT_X if case_type == CaseType::CaseX => Bit::Sa,
                    DIGIT_X => Bit::Sx,
                    DIGIT_Z if case_type != CaseType::Normal => Bit::Sa,
                    DIGIT_Z => Bit::Sz,
                    d if d & (1 << i) != 0 => Bit::S1,
                    _ => Bit::S0,
                });
            }
        }
    }

    let msb = bits.last().copied().unwrap_or(Bit::S0);
    let pad = match msb {
        Bit::S0 | Bit::S1 => Bit::S0,
        x => x,
    };
    match size {
        None => {
            if bits.len() < 32 {
                bits.resize(32, pad);
            }
        }
        Some(0) => return Err(Malformed),
        Some(n) => bits.resize(n, pad),
    }
    Ok(bits)
}

/// Check whether a constant contains high-impedance bits.
pub fn has_z_bits(node: &AstNode) -> bool {
    node.bits.iter().any(|b| *b == Bit::Sz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use svfront_common::source::INVALID_SPAN;
    use Bit::*;

    fn conv(code: &str) -> AstNode {
        const2ast(code, CaseType::Normal, INVALID_SPAN).unwrap()
    }

    #[test]
    fn plain_decimal() {
        let c = conv("123");
        assert_eq!(c.bits.len(), 32);
        assert_eq!(c.integer, 123);
        assert!(c.is_signed());
        assert!(!c.is(NodeFlags::UNSIZED));

        let c = conv("2147483648");
        assert_eq!(c.bits.len(), 33);
        assert_eq!(c.bits[31], S1);
        assert_eq!(c.bits[32], S0);

        let c = conv("1_000");
        assert_eq!(c.integer, 1000);
    }

    #[test]
    fn sized_based() {
        let c = conv("8'hff");
        assert_eq!(c.bits, vec![S1; 8]);
        assert!(!c.is_signed());

        let c = conv("4'b1x");
        assert_eq!(c.bits, vec![Sx, S1, S0, S0]);

        let c = conv("4'bx");
        assert_eq!(c.bits, vec![Sx; 4]);

        let c = conv("2'hff");
        assert_eq!(c.bits, vec![S1, S1]);

        let c = conv("6'o17");
        assert_eq!(c.bits, vec![S1, S1, S1, S1, S0, S0]);

        let c = conv("4'd10");
        assert_eq!(c.bits, vec![S0, S1, S0, S1]);

        let c = conv("3'dz");
        assert_eq!(c.bits, vec![Sz; 3]);

        let c = conv("8'sd5");
        assert!(c.is_signed());
        assert_eq!(c.integer, 5);
    }

    #[test]
    fn unsized_based() {
        let c = conv("'hf");
        assert_eq!(c.bits.len(), 32);
        assert!(c.is(NodeFlags::UNSIZED));
        assert_eq!(c.integer, 15);

        let c = conv("'bz");
        assert_eq!(c.bits, vec![Sz; 32]);
        assert!(has_z_bits(&c));
    }

    #[test]
    fn unbased_unsized() {
        let c = conv("'1");
        assert_eq!(c.bits, vec![S1]);
        assert!(c.is(NodeFlags::UNSIZED));
        assert_eq!(conv("'x").bits, vec![Sx]);
    }

    #[test]
    fn case_wildcards() {
        let c = const2ast("4'b1?0z", CaseType::CaseZ, INVALID_SPAN).unwrap();
        assert_eq!(c.bits, vec![Sa, S0, Sa, S1]);
        let c = const2ast("2'bx1", CaseType::CaseZ, INVALID_SPAN).unwrap();
        assert_eq!(c.bits, vec![S1, Sx]);
        let c = const2ast("2'bx1", CaseType::CaseX, INVALID_SPAN).unwrap();
        assert_eq!(c.bits, vec![S1, Sa]);
    }

    fn conv_err(code: &str) -> ConvError {
        const2ast(code, CaseType::Normal, INVALID_SPAN).unwrap_err()
    }

    #[test]
    fn malformed() {
        assert_eq!(conv_err("4'b2"), ConvError::Malformed);
        assert_eq!(conv_err("8'o9"), ConvError::Malformed);
        assert_eq!(conv_err("0'b1"), ConvError::Malformed);
        assert_eq!(conv_err("4'q1"), ConvError::Malformed);
        assert_eq!(conv_err(""), ConvError::Malformed);
    }

    #[test]
    fn width_limit() {
        assert_eq!(conv_err("99999999999'h0"), ConvError::TooWide);
        assert_eq!(conv_err("999999999999999999999999'h0"), ConvError::TooWide);
        assert_eq!(conv_err("16777217'b1"), ConvError::TooWide);
        assert_eq!(conv("16777216'b1").bits.len(), MAX_LITERAL_WIDTH);
    }
}
