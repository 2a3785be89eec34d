//! Envelope encoding for call contexts and block info.
//!
//! Both envelopes are Molecule-style tables. All numeric values are
//! little-endian.
//!
//! ```text
//! table := total_size: u32 | offset[0..n]: u32 | field[0] .. field[n-1]
//!
//! CallContext := table { from_id: u32, to_id: u32, call_type: u8, args: bytes }
//! BlockInfo   := table { number: u64, timestamp: u64, producer_id: u32 }
//! bytes       := count: u32 | count raw bytes
//! ```
//!
//! Decoding verifies the whole table before reading any field: the header
//! must equal the buffer length, the offset table must be well-formed and
//! every field must have exactly its schema size.

use crate::call::{BlockInfo, CallContext};
use crate::error::{ExecError, ExecResult};
use crate::types::{u32_from_le_bytes, u64_from_le_bytes, BLOCK_INFO_MAX_LEN, CALL_CONTEXT_MAX_LEN};

const HEADER_SIZE: usize = 4;

const CALL_CONTEXT_FIELDS: usize = 4;
const BLOCK_INFO_FIELDS: usize = 3;

/// Expected shape of a single table field.
#[derive(Debug, Clone, Copy)]
enum FieldSchema {
    Fixed(usize),
    Bytes,
}

const CALL_CONTEXT_SCHEMA: [FieldSchema; CALL_CONTEXT_FIELDS] = [
    FieldSchema::Fixed(4),
    FieldSchema::Fixed(4),
    FieldSchema::Fixed(1),
    FieldSchema::Bytes,
];

const BLOCK_INFO_SCHEMA: [FieldSchema; BLOCK_INFO_FIELDS] = [
    FieldSchema::Fixed(8),
    FieldSchema::Fixed(8),
    FieldSchema::Fixed(4),
];

/// A cursor for reading bytes during decoding.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_bytes(&mut self, n: usize) -> ExecResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| ExecError::invalid_data("unexpected end of data"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> ExecResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> ExecResult<u32> {
        u32_from_le_bytes(self.read_bytes(4)?)
            .ok_or_else(|| ExecError::invalid_data("truncated u32"))
    }

    fn read_u64(&mut self) -> ExecResult<u64> {
        u64_from_le_bytes(self.read_bytes(8)?)
            .ok_or_else(|| ExecError::invalid_data("truncated u64"))
    }

    fn read_var_bytes(&mut self) -> ExecResult<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }
}

/// A table whose header, offsets and field sizes have all been verified.
struct VerifiedTable<'a> {
    data: &'a [u8],
    /// Field boundaries; `bounds[i]..bounds[i + 1]` is field `i`.
    bounds: Vec<usize>,
}

impl<'a> VerifiedTable<'a> {
    fn verify(data: &'a [u8], schema: &[FieldSchema]) -> ExecResult<Self> {
        let mut r = Reader::new(data);
        let total_size = r.read_u32()? as usize;
        if total_size != data.len() {
            return Err(ExecError::invalid_data(format!(
                "table size header {} does not match buffer length {}",
                total_size,
                data.len()
            )));
        }

        let header_len = HEADER_SIZE * (schema.len() + 1);
        let mut bounds = Vec::with_capacity(schema.len() + 1);
        for _ in 0..schema.len() {
            bounds.push(r.read_u32()? as usize);
        }
        bounds.push(total_size);

        if bounds[0] != header_len {
            return Err(ExecError::invalid_data(format!(
                "table has {} fields, expected {}",
                (bounds[0] / HEADER_SIZE).saturating_sub(1),
                schema.len()
            )));
        }
        if bounds.windows(2).any(|w| w[0] > w[1]) {
            return Err(ExecError::invalid_data("table offsets out of order"));
        }

        let table = Self { data, bounds };
        for (index, field_schema) in schema.iter().enumerate() {
            let field = table.field(index);
            let valid = match field_schema {
                FieldSchema::Fixed(size) => field.len() == *size,
                FieldSchema::Bytes => {
                    let mut fr = Reader::new(field);
                    fr.read_var_bytes().is_ok() && fr.pos == field.len()
                }
            };
            if !valid {
                return Err(ExecError::invalid_data(format!(
                    "field {} has invalid size {}",
                    index,
                    field.len()
                )));
            }
        }
        Ok(table)
    }

    fn field(&self, index: usize) -> &'a [u8] {
        &self.data[self.bounds[index]..self.bounds[index + 1]]
    }

    fn reader(&self, index: usize) -> Reader<'a> {
        Reader::new(self.field(index))
    }
}

// ── Encoding helpers ──

fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Length as a table `u32`, rejecting anything that would not fit.
fn len_u32(len: usize) -> ExecResult<u32> {
    u32::try_from(len)
        .map_err(|_| ExecError::invalid_data(format!("length {} does not fit in u32", len)))
}

fn write_var_bytes(buf: &mut Vec<u8>, data: &[u8]) -> ExecResult<()> {
    write_u32(buf, len_u32(data.len())?);
    buf.extend_from_slice(data);
    Ok(())
}

fn write_table(fields: &[Vec<u8>]) -> ExecResult<Vec<u8>> {
    let header_len = HEADER_SIZE * (fields.len() + 1);
    let total: usize = header_len + fields.iter().map(Vec::len).sum::<usize>();

    let mut buf = Vec::with_capacity(total);
    write_u32(&mut buf, len_u32(total)?);
    let mut offset = header_len;
    for field in fields {
        write_u32(&mut buf, len_u32(offset)?);
        offset += field.len();
    }
    for field in fields {
        buf.extend_from_slice(field);
    }
    Ok(buf)
}

// ── CallContext ──

/// Encode a `CallContext` envelope.
///
/// Fails with `InvalidData` if a length does not fit the `u32` header.
pub fn encode_call_context(ctx: &CallContext<'_>) -> ExecResult<Vec<u8>> {
    let mut args = Vec::with_capacity(4 + ctx.args.len());
    write_var_bytes(&mut args, ctx.args)?;
    write_table(&[
        ctx.from_id.to_le_bytes().to_vec(),
        ctx.to_id.to_le_bytes().to_vec(),
        vec![ctx.raw_call_type],
        args,
    ])
}

/// Decode and verify a `CallContext` envelope.
///
/// The returned context borrows its `args` from `data`. The raw call type is
/// kept as-is; an unknown tag is rejected later, at dispatch.
pub fn decode_call_context(data: &[u8]) -> ExecResult<CallContext<'_>> {
    if data.len() > CALL_CONTEXT_MAX_LEN {
        return Err(ExecError::invalid_data(format!(
            "call context of {} bytes exceeds {}",
            data.len(),
            CALL_CONTEXT_MAX_LEN
        )));
    }
    let table = VerifiedTable::verify(data, &CALL_CONTEXT_SCHEMA)?;

    Ok(CallContext {
        from_id: table.reader(0).read_u32()?,
        to_id: table.reader(1).read_u32()?,
        raw_call_type: table.reader(2).read_u8()?,
        args: table.reader(3).read_var_bytes()?,
    })
}

// ── BlockInfo ──

/// Encode a `BlockInfo` envelope.
pub fn encode_block_info(info: &BlockInfo) -> ExecResult<Vec<u8>> {
    write_table(&[
        info.number.to_le_bytes().to_vec(),
        info.timestamp.to_le_bytes().to_vec(),
        info.producer_id.to_le_bytes().to_vec(),
    ])
}

/// Decode and verify a `BlockInfo` envelope.
pub fn decode_block_info(data: &[u8]) -> ExecResult<BlockInfo> {
    if data.len() > BLOCK_INFO_MAX_LEN {
        return Err(ExecError::invalid_data(format!(
            "block info of {} bytes exceeds {}",
            data.len(),
            BLOCK_INFO_MAX_LEN
        )));
    }
    let table = VerifiedTable::verify(data, &BLOCK_INFO_SCHEMA)?;

    Ok(BlockInfo {
        number: table.reader(0).read_u64()?,
        timestamp: table.reader(1).read_u64()?,
        producer_id: table.reader(2).read_u32()?,
    })
}
