//! # Legacy Message Compilation
//!
//! Account keys are merged across instructions (signer and writable flags
//! OR-ed together), then ordered:
//!
//! 1. writable signers (fee payer always first)
//! 2. read-only signers
//! 3. writable non-signers
//! 4. read-only non-signers (program ids land here)
//!
//! Within a group keys keep first-appearance order. Lengths use the
//! compact-u16 encoding: 7 bits per byte, high bit set on all but the last.

use crate::domain::errors::BuilderError;
use crate::domain::transaction::{
    CompiledInstruction, Message, MessageHeader, SignedTransaction,
};
use shared_crypto::Ed25519Signature;
use shared_types::{Hash, Instruction, Pubkey};

/// Largest serialized transaction the network accepts.
pub const PACKET_DATA_SIZE: usize = 1232;

/// Most account keys a legacy message can index.
pub const MAX_ACCOUNT_KEYS: usize = 256;

/// Append a compact-u16 length.
pub fn encode_length(out: &mut Vec<u8>, len: usize) {
    let mut rem = len;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            return;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

#[derive(Clone, Copy)]
struct KeyFlags {
    pubkey: Pubkey,
    signer: bool,
    writable: bool,
}

/// Compile instructions into a legacy message paid for by `fee_payer`.
pub fn compile_message(
    fee_payer: &Pubkey,
    instructions: &[Instruction],
    recent_blockhash: Hash,
) -> Result<Message, BuilderError> {
    let mut keys: Vec<KeyFlags> = vec![KeyFlags {
        pubkey: *fee_payer,
        signer: true,
        writable: true,
    }];
    let mut merge = |pubkey: Pubkey, signer: bool, writable: bool| {
        match keys.iter_mut().find(|k| k.pubkey == pubkey) {
            Some(existing) => {
                existing.signer |= signer;
                existing.writable |= writable;
            }
            None => keys.push(KeyFlags {
                pubkey,
                signer,
                writable,
            }),
        }
    };
    for ix in instructions {
        for meta in &ix.accounts {
            merge(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        merge(ix.program_id, false, false);
    }

    let group = |signer: bool, writable: bool| {
        keys.iter()
            .filter(move |k| k.signer == signer && k.writable == writable)
            .map(|k| k.pubkey)
    };
    let writable_signed: Vec<Pubkey> = group(true, true).collect();
    let readonly_signed: Vec<Pubkey> = group(true, false).collect();
    let writable_unsigned: Vec<Pubkey> = group(false, true).collect();
    let readonly_unsigned: Vec<Pubkey> = group(false, false).collect();

    let header = MessageHeader {
        num_required_signatures: count_u8(writable_signed.len() + readonly_signed.len())?,
        num_readonly_signed_accounts: count_u8(readonly_signed.len())?,
        num_readonly_unsigned_accounts: count_u8(readonly_unsigned.len())?,
    };

    let account_keys: Vec<Pubkey> = writable_signed
        .into_iter()
        .chain(readonly_signed)
        .chain(writable_unsigned)
        .chain(readonly_unsigned)
        .collect();
    if account_keys.len() > MAX_ACCOUNT_KEYS {
        return Err(BuilderError::MessageTooLarge(format!(
            "{} account keys (max {MAX_ACCOUNT_KEYS})",
            account_keys.len()
        )));
    }

    let index_of = |pubkey: &Pubkey| -> Result<u8, BuilderError> {
        account_keys
            .iter()
            .position(|k| k == pubkey)
            .and_then(|i| u8::try_from(i).ok())
            .ok_or_else(|| BuilderError::MessageTooLarge(format!("no index for {pubkey}")))
    };
    let compiled = instructions
        .iter()
        .map(|ix| {
            Ok(CompiledInstruction {
                program_id_index: index_of(&ix.program_id)?,
                accounts: ix
                    .accounts
                    .iter()
                    .map(|m| index_of(&m.pubkey))
                    .collect::<Result<_, BuilderError>>()?,
                data: ix.data.clone(),
            })
        })
        .collect::<Result<Vec<_>, BuilderError>>()?;

    Ok(Message {
        header,
        account_keys,
        recent_blockhash,
        instructions: compiled,
    })
}

fn count_u8(n: usize) -> Result<u8, BuilderError> {
    u8::try_from(n).map_err(|_| BuilderError::MessageTooLarge(format!("{n} keys in one group")))
}

/// Message wire bytes.
pub fn encode_message(message: &Message) -> Vec<u8> {
    let mut out = Vec::with_capacity(3 + 1 + message.account_keys.len() * 32 + 32 + 64);
    out.push(message.header.num_required_signatures);
    out.push(message.header.num_readonly_signed_accounts);
    out.push(message.header.num_readonly_unsigned_accounts);
    encode_length(&mut out, message.account_keys.len());
    for key in &message.account_keys {
        out.extend_from_slice(key.as_ref());
    }
    out.extend_from_slice(&message.recent_blockhash);
    encode_length(&mut out, message.instructions.len());
    for ix in &message.instructions {
        out.push(ix.program_id_index);
        encode_length(&mut out, ix.accounts.len());
        out.extend_from_slice(&ix.accounts);
        encode_length(&mut out, ix.data.len());
        out.extend_from_slice(&ix.data);
    }
    out
}

/// Transaction wire bytes.
pub fn encode_transaction(tx: &SignedTransaction) -> Vec<u8> {
    let message = encode_message(&tx.message);
    let mut out = Vec::with_capacity(3 + tx.signatures.len() * 64 + message.len());
    encode_length(&mut out, tx.signatures.len());
    for sig in &tx.signatures {
        out.extend_from_slice(sig.as_bytes());
    }
    out.extend_from_slice(&message);
    out
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], BuilderError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                BuilderError::Malformed(format!(
                    "need {n} bytes at offset {}, have {}",
                    self.pos,
                    self.bytes.len() - self.pos
                ))
            })?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, BuilderError> {
        Ok(self.take(1)?[0])
    }

    fn length(&mut self) -> Result<usize, BuilderError> {
        let mut value = 0usize;
        for i in 0..3 {
            let byte = self.u8()?;
            value |= usize::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(BuilderError::Malformed("compact length over 3 bytes".into()))
    }

    fn array32(&mut self) -> Result<[u8; 32], BuilderError> {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.take(32)?);
        Ok(out)
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}

/// Parse message wire bytes; trailing bytes are rejected.
pub fn decode_message(bytes: &[u8]) -> Result<Message, BuilderError> {
    let mut r = Reader::new(bytes);
    let header = MessageHeader {
        num_required_signatures: r.u8()?,
        num_readonly_signed_accounts: r.u8()?,
        num_readonly_unsigned_accounts: r.u8()?,
    };
    let key_count = r.length()?;
    let mut account_keys = Vec::with_capacity(key_count.min(MAX_ACCOUNT_KEYS));
    for _ in 0..key_count {
        account_keys.push(Pubkey::new(r.array32()?));
    }
    let signed = usize::from(header.num_required_signatures);
    if signed > account_keys.len()
        || usize::from(header.num_readonly_signed_accounts) > signed
        || usize::from(header.num_readonly_unsigned_accounts) > account_keys.len() - signed
    {
        return Err(BuilderError::Malformed("header counts exceed account keys".into()));
    }
    let recent_blockhash = r.array32()?;
    let ix_count = r.length()?;
    let mut instructions = Vec::with_capacity(ix_count.min(64));
    for _ in 0..ix_count {
        let program_id_index = r.u8()?;
        let n = r.length()?;
        let accounts = r.take(n)?.to_vec();
        let n = r.length()?;
        let data = r.take(n)?.to_vec();
        instructions.push(CompiledInstruction {
            program_id_index,
            accounts,
            data,
        });
    }
    if !r.rest().is_empty() {
        return Err(BuilderError::Malformed(format!(
            "{} trailing bytes after message",
            r.rest().len()
        )));
    }
    Ok(Message {
        header,
        account_keys,
        recent_blockhash,
        instructions,
    })
}

/// Parse transaction wire bytes.
pub fn decode_transaction(bytes: &[u8]) -> Result<SignedTransaction, BuilderError> {
    let mut r = Reader::new(bytes);
    let count = r.length()?;
    let mut signatures = Vec::with_capacity(count.min(16));
    for _ in 0..count {
        let raw = r.take(64)?;
        let sig = Ed25519Signature::try_from_slice(raw)
            .map_err(|e| BuilderError::Malformed(e.to_string()))?;
        signatures.push(sig);
    }
    let message = decode_message(r.rest())?;
    Ok(SignedTransaction {
        signatures,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::AccountMeta;

    fn key(b: u8) -> Pubkey {
        Pubkey::new([b; 32])
    }

    #[test]
    fn test_compact_length_encoding() {
        let cases: [(usize, &[u8]); 5] = [
            (0, &[0x00]),
            (0x7f, &[0x7f]),
            (0x80, &[0x80, 0x01]),
            (0x3fff, &[0xff, 0x7f]),
            (0x4000, &[0x80, 0x80, 0x01]),
        ];
        for (len, expected) in cases {
            let mut out = Vec::new();
            encode_length(&mut out, len);
            assert_eq!(out, expected, "length {len}");
            assert_eq!(Reader::new(&out).length().unwrap(), len);
        }
    }

    #[test]
    fn test_key_ordering_and_header() {
        let payer = key(1);
        let program = key(9);
        let ix = Instruction {
            program_id: program,
            accounts: vec![
                AccountMeta::new_readonly(key(4), false),
                AccountMeta::new(key(3), false),
                AccountMeta::new_readonly(key(2), true),
                AccountMeta::new(payer, true),
            ],
            data: vec![1, 2, 3],
        };
        let message = compile_message(&payer, &[ix], [7u8; 32]).unwrap();

        assert_eq!(
            message.account_keys,
            vec![payer, key(2), key(3), key(4), program]
        );
        assert_eq!(
            message.header,
            MessageHeader {
                num_required_signatures: 2,
                num_readonly_signed_accounts: 1,
                num_readonly_unsigned_accounts: 2,
            }
        );
        assert_eq!(message.instructions[0].program_id_index, 4);
        assert_eq!(message.instructions[0].accounts, vec![3, 2, 1, 0]);
        assert!(message.is_writable(0));
        assert!(!message.is_writable(1));
        assert!(message.is_writable(2));
        assert!(!message.is_writable(3));
        assert!(!message.is_writable(4));
    }

    #[test]
    fn test_flags_merge_across_metas() {
        let payer = key(1);
        let shared = key(5);
        let a = Instruction {
            program_id: key(9),
            accounts: vec![AccountMeta::new_readonly(shared, false)],
            data: vec![],
        };
        let b = Instruction {
            program_id: key(9),
            accounts: vec![AccountMeta::new(shared, false)],
            data: vec![],
        };
        let message = compile_message(&payer, &[a, b], [0u8; 32]).unwrap();
        assert_eq!(message.account_keys, vec![payer, shared, key(9)]);
        assert_eq!(message.header.num_readonly_unsigned_accounts, 1);
    }

    #[test]
    fn test_decode_inverts_encode_and_decompile_restores_metas() {
        let payer = key(1);
        let ix = Instruction {
            program_id: key(9),
            accounts: vec![AccountMeta::new(payer, true), AccountMeta::new(key(3), false)],
            data: vec![0xAA; 200],
        };
        let message = compile_message(&payer, &[ix.clone()], [3u8; 32]).unwrap();
        let decoded = decode_message(&encode_message(&message)).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.decompile().unwrap(), vec![ix]);
    }

    #[test]
    fn test_decode_rejects_truncated_and_trailing() {
        let payer = key(1);
        let message = compile_message(&payer, &[], [0u8; 32]).unwrap();
        let bytes = encode_message(&message);
        assert!(decode_message(&bytes[..bytes.len() - 1]).is_err());
        let mut long = bytes.clone();
        long.push(0);
        assert!(decode_message(&long).is_err());
    }

    #[test]
    fn test_decode_rejects_inconsistent_header() {
        let mut bytes = vec![3, 0, 0];
        encode_length(&mut bytes, 1);
        bytes.extend_from_slice(&[1u8; 32]);
        bytes.extend_from_slice(&[0u8; 32]);
        encode_length(&mut bytes, 0);
        assert!(matches!(
            decode_message(&bytes),
            Err(BuilderError::Malformed(_))
        ));
    }
}
