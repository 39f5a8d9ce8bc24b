#[cfg(test)]
mod tests {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    const EXPECTED_OPCODE_TABLE_HASH: u64 = 7396996726553078190;

    fn fnv1a64(mut h: u64, bytes: &[u8]) -> u64 {
        for b in bytes {
            h ^= *b as u64;
            h = h.wrapping_mul(FNV_PRIME);
        }
        h
    }

    macro_rules! hash_opcodes {
        (
            $( $(#[$doc:meta])* $name:ident = $opcode:literal, $mnemonic:literal => $size:ident($len:literal), $price:literal ),* $(,)?
        ) => {{
            let mut h = FNV_OFFSET;
            $(
                h = fnv1a64(h, stringify!($name).as_bytes());
                h = fnv1a64(h, &[crate::virtual_machine::isa::OpCode::$name as u8]);
                h = fnv1a64(h, $mnemonic.as_bytes());
                h = fnv1a64(h, stringify!($size).as_bytes());
                h = fnv1a64(h, &($len as u64).to_le_bytes());
                h = fnv1a64(h, &($price as u64).to_le_bytes());
            )*
            h
        }};
    }

    fn current_table_hash() -> u64 {
        crate::for_each_opcode!(hash_opcodes)
    }

    #[test]
    #[ignore]
    fn print_opcode_table_hash() {
        println!("OPCODE_TABLE_HASH={}", current_table_hash());
    }

    #[test]
    fn opcode_table_unchanged() {
        assert_eq!(current_table_hash(), EXPECTED_OPCODE_TABLE_HASH);
    }
}
