use std::iter::repeat;

use crate::bit_reader::BitReader;
use crate::error::{Error, Result};
use crate::reader::JpegRead;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HuffmanTableClass {
    DC,
    AC,
}

/// A node of the decoding tree. A bit of `0` selects the left child.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Leaf(u8),
    Internal(Box<Node>, Box<Node>),
    Empty,
}

#[derive(Clone, Debug)]
pub struct HuffmanTable {
    pub class: HuffmanTableClass,
    root: Node,
    values: Vec<u8>,
}

impl HuffmanTable {
    /// Builds the canonical code tree from the DHT length counts and symbols.
    pub fn new(bits: &[u8; 16], values: &[u8], class: HuffmanTableClass) -> Result<HuffmanTable> {
        let (huffcode, huffsize) = derive_huffman_codes(bits)?;

        if huffsize.len() != values.len() {
            return Err(Error::Format(format!(
                "huffman table declares {} codes but has {} values",
                huffsize.len(),
                values.len()
            )));
        }

        let mut root = Node::Empty;

        for ((&code, &size), &value) in huffcode.iter().zip(&huffsize).zip(values) {
            let mut node = &mut root;

            for depth in (0 .. size).rev() {
                if *node == Node::Empty {
                    *node = Node::Internal(Box::new(Node::Empty), Box::new(Node::Empty));
                }

                node = match *node {
                    Node::Internal(ref mut left, ref mut right) => {
                        if (code >> depth) & 1 == 0 { &mut **left } else { &mut **right }
                    },
                    _ => return Err(Error::Format("huffman code is a prefix of another".to_owned())),
                };
            }

            if *node != Node::Empty {
                return Err(Error::Format("huffman code assigned twice".to_owned()));
            }

            *node = Node::Leaf(value);
        }

        Ok(HuffmanTable {
            class,
            root,
            values: values.to_vec(),
        })
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    // Section F.2.2.3
    /// Walks the tree one bit at a time until a leaf is reached.
    pub fn decode<R: JpegRead + ?Sized>(&self, reader: &mut BitReader<R>) -> Result<u8> {
        let mut node = &self.root;

        loop {
            match *node {
                Node::Leaf(value) => return Ok(value),
                Node::Internal(ref left, ref right) => {
                    node = if reader.read_bit()? == 0 { &**left } else { &**right };
                },
                Node::Empty => return Err(Error::Format("failed to decode huffman code".to_owned())),
            }
        }
    }
}

/// Canonical code assignment, returns the codes and their lengths in symbol order.
pub(crate) fn derive_huffman_codes(bits: &[u8; 16]) -> Result<(Vec<u16>, Vec<u8>)> {
    // Figure C.1
    let huffsize = bits.iter()
                       .enumerate()
                       .fold(Vec::new(), |mut acc, (i, &value)| {
                           acc.extend(repeat((i + 1) as u8).take(value as usize));
                           acc
                       });

    // Figure C.2
    let mut huffcode = vec![0u16; huffsize.len()];
    let mut size = *huffsize.first().unwrap_or(&0);
    let mut code = 0u32;

    for (i, &v) in huffsize.iter().enumerate() {
        while size != v {
            code <<= 1;
            size += 1;
        }

        if code >= (1u32 << size) {
            return Err(Error::Format("bad huffman code length".to_owned()));
        }

        huffcode[i] = code as u16;
        code += 1;
    }

    Ok((huffcode, huffsize))
}

// Section F.2.2.1
// Figure F.12
pub(crate) fn extend(value: i32, count: u8) -> i32 {
    let vt = 1 << (count as u32 - 1);

    if value < vt {
        value + (-1 << count as i32) + 1
    } else {
        value
    }
}
