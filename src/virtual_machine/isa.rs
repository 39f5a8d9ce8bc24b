//! Opcode table for the ledger's stack machine.
//!
//! The [`for_each_opcode!`](crate::for_each_opcode) macro holds the canonical
//! opcode definitions and invokes a callback macro for code generation, so the
//! tokenizer, the script builder and the table lock test all read one list.
//!
//! This module generates:
//! - The [`OpCode`] enum with byte mappings
//! - `TryFrom<u8>` for decoding opcodes
//! - Mnemonics, operand sizes and static prices
//!
//! # Script Format
//!
//! Every instruction is one opcode byte followed by its operand:
//! - `Fixed(n)`: exactly `n` operand bytes (`PUSHBYTES1..75`, jumps, `SYSCALL`)
//! - `Prefixed(n)`: an `n`-byte little-endian length, then that many bytes
//!   (`PUSHDATA1/2/4`)
//!
//! Prices are in base units (1e-8 GAS). `SYSCALL` is free at the opcode level
//! and charged by the interop service it calls.

use crate::types::encoding::EncodingError;

/// Operand layout that follows an opcode byte.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OperandSize {
    /// A fixed number of operand bytes, possibly zero.
    Fixed(usize),
    /// A little-endian length prefix of the given width, then the operand.
    Prefixed(usize),
}

/// Invokes a callback macro with the complete opcode definition list.
#[macro_export]
macro_rules! for_each_opcode {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Constants
            // =========================
            /// PUSH0 ; pushes an empty byte array (false, zero)
            Push0 = 0x00, "PUSH0" => Fixed(0), 30,
            /// PUSHBYTES1 ; pushes the next 1 byte
            PushBytes1 = 0x01, "PUSHBYTES1" => Fixed(1), 120,
            /// PUSHBYTES2 ; pushes the next 2 bytes
            PushBytes2 = 0x02, "PUSHBYTES2" => Fixed(2), 120,
            /// PUSHBYTES3 ; pushes the next 3 bytes
            PushBytes3 = 0x03, "PUSHBYTES3" => Fixed(3), 120,
            /// PUSHBYTES4 ; pushes the next 4 bytes
            PushBytes4 = 0x04, "PUSHBYTES4" => Fixed(4), 120,
            /// PUSHBYTES5 ; pushes the next 5 bytes
            PushBytes5 = 0x05, "PUSHBYTES5" => Fixed(5), 120,
            /// PUSHBYTES6 ; pushes the next 6 bytes
            PushBytes6 = 0x06, "PUSHBYTES6" => Fixed(6), 120,
            /// PUSHBYTES7 ; pushes the next 7 bytes
            PushBytes7 = 0x07, "PUSHBYTES7" => Fixed(7), 120,
            /// PUSHBYTES8 ; pushes the next 8 bytes
            PushBytes8 = 0x08, "PUSHBYTES8" => Fixed(8), 120,
            /// PUSHBYTES9 ; pushes the next 9 bytes
            PushBytes9 = 0x09, "PUSHBYTES9" => Fixed(9), 120,
            /// PUSHBYTES10 ; pushes the next 10 bytes
            PushBytes10 = 0x0a, "PUSHBYTES10" => Fixed(10), 120,
            /// PUSHBYTES11 ; pushes the next 11 bytes
            PushBytes11 = 0x0b, "PUSHBYTES11" => Fixed(11), 120,
            /// PUSHBYTES12 ; pushes the next 12 bytes
            PushBytes12 = 0x0c, "PUSHBYTES12" => Fixed(12), 120,
            /// PUSHBYTES13 ; pushes the next 13 bytes
            PushBytes13 = 0x0d, "PUSHBYTES13" => Fixed(13), 120,
            /// PUSHBYTES14 ; pushes the next 14 bytes
            PushBytes14 = 0x0e, "PUSHBYTES14" => Fixed(14), 120,
            /// PUSHBYTES15 ; pushes the next 15 bytes
            PushBytes15 = 0x0f, "PUSHBYTES15" => Fixed(15), 120,
            /// PUSHBYTES16 ; pushes the next 16 bytes
            PushBytes16 = 0x10, "PUSHBYTES16" => Fixed(16), 120,
            /// PUSHBYTES17 ; pushes the next 17 bytes
            PushBytes17 = 0x11, "PUSHBYTES17" => Fixed(17), 120,
            /// PUSHBYTES18 ; pushes the next 18 bytes
            PushBytes18 = 0x12, "PUSHBYTES18" => Fixed(18), 120,
            /// PUSHBYTES19 ; pushes the next 19 bytes
            PushBytes19 = 0x13, "PUSHBYTES19" => Fixed(19), 120,
            /// PUSHBYTES20 ; pushes the next 20 bytes
            PushBytes20 = 0x14, "PUSHBYTES20" => Fixed(20), 120,
            /// PUSHBYTES21 ; pushes the next 21 bytes
            PushBytes21 = 0x15, "PUSHBYTES21" => Fixed(21), 120,
            /// PUSHBYTES22 ; pushes the next 22 bytes
            PushBytes22 = 0x16, "PUSHBYTES22" => Fixed(22), 120,
            /// PUSHBYTES23 ; pushes the next 23 bytes
            PushBytes23 = 0x17, "PUSHBYTES23" => Fixed(23), 120,
            /// PUSHBYTES24 ; pushes the next 24 bytes
            PushBytes24 = 0x18, "PUSHBYTES24" => Fixed(24), 120,
            /// PUSHBYTES25 ; pushes the next 25 bytes
            PushBytes25 = 0x19, "PUSHBYTES25" => Fixed(25), 120,
            /// PUSHBYTES26 ; pushes the next 26 bytes
            PushBytes26 = 0x1a, "PUSHBYTES26" => Fixed(26), 120,
            /// PUSHBYTES27 ; pushes the next 27 bytes
            PushBytes27 = 0x1b, "PUSHBYTES27" => Fixed(27), 120,
            /// PUSHBYTES28 ; pushes the next 28 bytes
            PushBytes28 = 0x1c, "PUSHBYTES28" => Fixed(28), 120,
            /// PUSHBYTES29 ; pushes the next 29 bytes
            PushBytes29 = 0x1d, "PUSHBYTES29" => Fixed(29), 120,
            /// PUSHBYTES30 ; pushes the next 30 bytes
            PushBytes30 = 0x1e, "PUSHBYTES30" => Fixed(30), 120,
            /// PUSHBYTES31 ; pushes the next 31 bytes
            PushBytes31 = 0x1f, "PUSHBYTES31" => Fixed(31), 120,
            /// PUSHBYTES32 ; pushes the next 32 bytes
            PushBytes32 = 0x20, "PUSHBYTES32" => Fixed(32), 120,
            /// PUSHBYTES33 ; pushes the next 33 bytes
            PushBytes33 = 0x21, "PUSHBYTES33" => Fixed(33), 120,
            /// PUSHBYTES34 ; pushes the next 34 bytes
            PushBytes34 = 0x22, "PUSHBYTES34" => Fixed(34), 120,
            /// PUSHBYTES35 ; pushes the next 35 bytes
            PushBytes35 = 0x23, "PUSHBYTES35" => Fixed(35), 120,
            /// PUSHBYTES36 ; pushes the next 36 bytes
            PushBytes36 = 0x24, "PUSHBYTES36" => Fixed(36), 120,
            /// PUSHBYTES37 ; pushes the next 37 bytes
            PushBytes37 = 0x25, "PUSHBYTES37" => Fixed(37), 120,
            /// PUSHBYTES38 ; pushes the next 38 bytes
            PushBytes38 = 0x26, "PUSHBYTES38" => Fixed(38), 120,
            /// PUSHBYTES39 ; pushes the next 39 bytes
            PushBytes39 = 0x27, "PUSHBYTES39" => Fixed(39), 120,
            /// PUSHBYTES40 ; pushes the next 40 bytes
            PushBytes40 = 0x28, "PUSHBYTES40" => Fixed(40), 120,
            /// PUSHBYTES41 ; pushes the next 41 bytes
            PushBytes41 = 0x29, "PUSHBYTES41" => Fixed(41), 120,
            /// PUSHBYTES42 ; pushes the next 42 bytes
            PushBytes42 = 0x2a, "PUSHBYTES42" => Fixed(42), 120,
            /// PUSHBYTES43 ; pushes the next 43 bytes
            PushBytes43 = 0x2b, "PUSHBYTES43" => Fixed(43), 120,
            /// PUSHBYTES44 ; pushes the next 44 bytes
            PushBytes44 = 0x2c, "PUSHBYTES44" => Fixed(44), 120,
            /// PUSHBYTES45 ; pushes the next 45 bytes
            PushBytes45 = 0x2d, "PUSHBYTES45" => Fixed(45), 120,
            /// PUSHBYTES46 ; pushes the next 46 bytes
            PushBytes46 = 0x2e, "PUSHBYTES46" => Fixed(46), 120,
            /// PUSHBYTES47 ; pushes the next 47 bytes
            PushBytes47 = 0x2f, "PUSHBYTES47" => Fixed(47), 120,
            /// PUSHBYTES48 ; pushes the next 48 bytes
            PushBytes48 = 0x30, "PUSHBYTES48" => Fixed(48), 120,
            /// PUSHBYTES49 ; pushes the next 49 bytes
            PushBytes49 = 0x31, "PUSHBYTES49" => Fixed(49), 120,
            /// PUSHBYTES50 ; pushes the next 50 bytes
            PushBytes50 = 0x32, "PUSHBYTES50" => Fixed(50), 120,
            /// PUSHBYTES51 ; pushes the next 51 bytes
            PushBytes51 = 0x33, "PUSHBYTES51" => Fixed(51), 120,
            /// PUSHBYTES52 ; pushes the next 52 bytes
            PushBytes52 = 0x34, "PUSHBYTES52" => Fixed(52), 120,
            /// PUSHBYTES53 ; pushes the next 53 bytes
            PushBytes53 = 0x35, "PUSHBYTES53" => Fixed(53), 120,
            /// PUSHBYTES54 ; pushes the next 54 bytes
            PushBytes54 = 0x36, "PUSHBYTES54" => Fixed(54), 120,
            /// PUSHBYTES55 ; pushes the next 55 bytes
            PushBytes55 = 0x37, "PUSHBYTES55" => Fixed(55), 120,
            /// PUSHBYTES56 ; pushes the next 56 bytes
            PushBytes56 = 0x38, "PUSHBYTES56" => Fixed(56), 120,
            /// PUSHBYTES57 ; pushes the next 57 bytes
            PushBytes57 = 0x39, "PUSHBYTES57" => Fixed(57), 120,
            /// PUSHBYTES58 ; pushes the next 58 bytes
            PushBytes58 = 0x3a, "PUSHBYTES58" => Fixed(58), 120,
            /// PUSHBYTES59 ; pushes the next 59 bytes
            PushBytes59 = 0x3b, "PUSHBYTES59" => Fixed(59), 120,
            /// PUSHBYTES60 ; pushes the next 60 bytes
            PushBytes60 = 0x3c, "PUSHBYTES60" => Fixed(60), 120,
            /// PUSHBYTES61 ; pushes the next 61 bytes
            PushBytes61 = 0x3d, "PUSHBYTES61" => Fixed(61), 120,
            /// PUSHBYTES62 ; pushes the next 62 bytes
            PushBytes62 = 0x3e, "PUSHBYTES62" => Fixed(62), 120,
            /// PUSHBYTES63 ; pushes the next 63 bytes
            PushBytes63 = 0x3f, "PUSHBYTES63" => Fixed(63), 120,
            /// PUSHBYTES64 ; pushes the next 64 bytes
            PushBytes64 = 0x40, "PUSHBYTES64" => Fixed(64), 120,
            /// PUSHBYTES65 ; pushes the next 65 bytes
            PushBytes65 = 0x41, "PUSHBYTES65" => Fixed(65), 120,
            /// PUSHBYTES66 ; pushes the next 66 bytes
            PushBytes66 = 0x42, "PUSHBYTES66" => Fixed(66), 120,
            /// PUSHBYTES67 ; pushes the next 67 bytes
            PushBytes67 = 0x43, "PUSHBYTES67" => Fixed(67), 120,
            /// PUSHBYTES68 ; pushes the next 68 bytes
            PushBytes68 = 0x44, "PUSHBYTES68" => Fixed(68), 120,
            /// PUSHBYTES69 ; pushes the next 69 bytes
            PushBytes69 = 0x45, "PUSHBYTES69" => Fixed(69), 120,
            /// PUSHBYTES70 ; pushes the next 70 bytes
            PushBytes70 = 0x46, "PUSHBYTES70" => Fixed(70), 120,
            /// PUSHBYTES71 ; pushes the next 71 bytes
            PushBytes71 = 0x47, "PUSHBYTES71" => Fixed(71), 120,
            /// PUSHBYTES72 ; pushes the next 72 bytes
            PushBytes72 = 0x48, "PUSHBYTES72" => Fixed(72), 120,
            /// PUSHBYTES73 ; pushes the next 73 bytes
            PushBytes73 = 0x49, "PUSHBYTES73" => Fixed(73), 120,
            /// PUSHBYTES74 ; pushes the next 74 bytes
            PushBytes74 = 0x4a, "PUSHBYTES74" => Fixed(74), 120,
            /// PUSHBYTES75 ; pushes the next 75 bytes
            PushBytes75 = 0x4b, "PUSHBYTES75" => Fixed(75), 120,
            /// PUSHDATA1 len:u8 ; pushes len bytes
            PushData1 = 0x4c, "PUSHDATA1" => Prefixed(1), 180,
            /// PUSHDATA2 len:u16 ; pushes len bytes
            PushData2 = 0x4d, "PUSHDATA2" => Prefixed(2), 13000,
            /// PUSHDATA4 len:u32 ; pushes len bytes
            PushData4 = 0x4e, "PUSHDATA4" => Prefixed(4), 110000,
            /// PUSHM1 ; pushes -1
            PushM1 = 0x4f, "PUSHM1" => Fixed(0), 30,
            /// PUSHNULL ; pushes null
            PushNull = 0x50, "PUSHNULL" => Fixed(0), 30,
            /// PUSH1 ; pushes 1 (true)
            Push1 = 0x51, "PUSH1" => Fixed(0), 30,
            /// PUSH2 ; pushes 2
            Push2 = 0x52, "PUSH2" => Fixed(0), 30,
            /// PUSH3 ; pushes 3
            Push3 = 0x53, "PUSH3" => Fixed(0), 30,
            /// PUSH4 ; pushes 4
            Push4 = 0x54, "PUSH4" => Fixed(0), 30,
            /// PUSH5 ; pushes 5
            Push5 = 0x55, "PUSH5" => Fixed(0), 30,
            /// PUSH6 ; pushes 6
            Push6 = 0x56, "PUSH6" => Fixed(0), 30,
            /// PUSH7 ; pushes 7
            Push7 = 0x57, "PUSH7" => Fixed(0), 30,
            /// PUSH8 ; pushes 8
            Push8 = 0x58, "PUSH8" => Fixed(0), 30,
            /// PUSH9 ; pushes 9
            Push9 = 0x59, "PUSH9" => Fixed(0), 30,
            /// PUSH10 ; pushes 10
            Push10 = 0x5a, "PUSH10" => Fixed(0), 30,
            /// PUSH11 ; pushes 11
            Push11 = 0x5b, "PUSH11" => Fixed(0), 30,
            /// PUSH12 ; pushes 12
            Push12 = 0x5c, "PUSH12" => Fixed(0), 30,
            /// PUSH13 ; pushes 13
            Push13 = 0x5d, "PUSH13" => Fixed(0), 30,
            /// PUSH14 ; pushes 14
            Push14 = 0x5e, "PUSH14" => Fixed(0), 30,
            /// PUSH15 ; pushes 15
            Push15 = 0x5f, "PUSH15" => Fixed(0), 30,
            /// PUSH16 ; pushes 16
            Push16 = 0x60, "PUSH16" => Fixed(0), 30,
            // =========================
            // Flow control
            // =========================
            /// NOP ; does nothing
            Nop = 0x61, "NOP" => Fixed(0), 30,
            /// JMP offset:i32 ; unconditional jump
            Jmp = 0x62, "JMP" => Fixed(4), 70,
            /// JMPIF offset:i32 ; jumps if top is true
            JmpIf = 0x63, "JMPIF" => Fixed(4), 70,
            /// JMPIFNOT offset:i32 ; jumps if top is false
            JmpIfNot = 0x64, "JMPIFNOT" => Fixed(4), 70,
            /// CALL offset:i32 ; calls a function in the same script
            Call = 0x65, "CALL" => Fixed(4), 22000,
            /// RET ; returns from the current context
            Ret = 0x66, "RET" => Fixed(0), 40,
            /// SYSCALL service:u32 ; invokes an interop service, priced by the service
            SysCall = 0x68, "SYSCALL" => Fixed(4), 0,
            // =========================
            // Stack
            // =========================
            /// XDROP ; removes the item n back
            XDrop = 0x6d, "XDROP" => Fixed(0), 400,
            /// XSWAP ; swaps top with the item n back
            XSwap = 0x72, "XSWAP" => Fixed(0), 60,
            /// XTUCK ; copies top to n back
            XTuck = 0x73, "XTUCK" => Fixed(0), 400,
            /// DEPTH ; pushes the stack size
            Depth = 0x74, "DEPTH" => Fixed(0), 60,
            /// DROP ; removes top
            Drop = 0x75, "DROP" => Fixed(0), 60,
            /// DUP ; duplicates top
            Dup = 0x76, "DUP" => Fixed(0), 60,
            /// NIP ; removes the second item
            Nip = 0x77, "NIP" => Fixed(0), 60,
            /// OVER ; copies the second item to top
            Over = 0x78, "OVER" => Fixed(0), 60,
            /// PICK ; copies the item n back to top
            Pick = 0x79, "PICK" => Fixed(0), 60,
            /// ROLL ; moves the item n back to top
            Roll = 0x7a, "ROLL" => Fixed(0), 400,
            /// ROT ; rotates the top three items
            Rot = 0x7b, "ROT" => Fixed(0), 60,
            /// SWAP ; swaps the top two items
            Swap = 0x7c, "SWAP" => Fixed(0), 60,
            /// TUCK ; copies top below the second item
            Tuck = 0x7d, "TUCK" => Fixed(0), 60,
            // =========================
            // Splice
            // =========================
            /// CAT ; concatenates two byte arrays
            Cat = 0x7e, "CAT" => Fixed(0), 80000,
            /// SUBSTR ; slices a byte array
            SubStr = 0x7f, "SUBSTR" => Fixed(0), 80000,
            /// LEFT ; keeps the leftmost n bytes
            Left = 0x80, "LEFT" => Fixed(0), 80000,
            /// RIGHT ; keeps the rightmost n bytes
            Right = 0x81, "RIGHT" => Fixed(0), 80000,
            /// SIZE ; pushes the byte length of top
            Size = 0x82, "SIZE" => Fixed(0), 60,
            // =========================
            // Bitwise
            // =========================
            /// INVERT ; bitwise not
            Invert = 0x83, "INVERT" => Fixed(0), 100,
            /// AND ; bitwise and
            And = 0x84, "AND" => Fixed(0), 200,
            /// OR ; bitwise or
            Or = 0x85, "OR" => Fixed(0), 200,
            /// XOR ; bitwise xor
            Xor = 0x86, "XOR" => Fixed(0), 200,
            /// EQUAL ; byte equality
            Equal = 0x87, "EQUAL" => Fixed(0), 200,
            // =========================
            // Arithmetic
            // =========================
            /// INC ; adds one
            Inc = 0x8b, "INC" => Fixed(0), 100,
            /// DEC ; subtracts one
            Dec = 0x8c, "DEC" => Fixed(0), 100,
            /// SIGN ; pushes -1, 0 or 1
            Sign = 0x8d, "SIGN" => Fixed(0), 100,
            /// NEGATE ; flips the sign
            Negate = 0x8f, "NEGATE" => Fixed(0), 100,
            /// ABS ; absolute value
            Abs = 0x90, "ABS" => Fixed(0), 100,
            /// NOT ; boolean not
            Not = 0x91, "NOT" => Fixed(0), 100,
            /// NZ ; pushes top != 0
            Nz = 0x92, "NZ" => Fixed(0), 100,
            /// ADD ; a + b
            Add = 0x93, "ADD" => Fixed(0), 200,
            /// SUB ; a - b
            Sub = 0x94, "SUB" => Fixed(0), 200,
            /// MUL ; a * b
            Mul = 0x95, "MUL" => Fixed(0), 300,
            /// DIV ; a / b
            Div = 0x96, "DIV" => Fixed(0), 300,
            /// MOD ; a % b
            Mod = 0x97, "MOD" => Fixed(0), 300,
            /// SHL ; a << b
            Shl = 0x98, "SHL" => Fixed(0), 300,
            /// SHR ; a >> b
            Shr = 0x99, "SHR" => Fixed(0), 300,
            /// BOOLAND ; a && b
            BoolAnd = 0x9a, "BOOLAND" => Fixed(0), 200,
            /// BOOLOR ; a || b
            BoolOr = 0x9b, "BOOLOR" => Fixed(0), 200,
            /// NUMEQUAL ; a == b
            NumEqual = 0x9c, "NUMEQUAL" => Fixed(0), 200,
            /// NUMNOTEQUAL ; a != b
            NumNotEqual = 0x9e, "NUMNOTEQUAL" => Fixed(0), 200,
            /// LT ; a < b
            Lt = 0x9f, "LT" => Fixed(0), 200,
            /// GT ; a > b
            Gt = 0xa0, "GT" => Fixed(0), 200,
            /// LTE ; a <= b
            Lte = 0xa1, "LTE" => Fixed(0), 200,
            /// GTE ; a >= b
            Gte = 0xa2, "GTE" => Fixed(0), 200,
            /// MIN ; smaller of a and b
            Min = 0xa3, "MIN" => Fixed(0), 200,
            /// MAX ; larger of a and b
            Max = 0xa4, "MAX" => Fixed(0), 200,
            /// WITHIN ; a <= x < b
            Within = 0xa5, "WITHIN" => Fixed(0), 200,
            // =========================
            // Collections
            // =========================
            /// ARRAYSIZE ; pushes the item count of a collection
            ArraySize = 0xc0, "ARRAYSIZE" => Fixed(0), 150,
            /// PACK ; pops n then n items into an array
            Pack = 0xc1, "PACK" => Fixed(0), 7000,
            /// UNPACK ; spreads an array back onto the stack
            Unpack = 0xc2, "UNPACK" => Fixed(0), 7000,
            /// PICKITEM ; reads a collection element
            PickItem = 0xc3, "PICKITEM" => Fixed(0), 270000,
            /// SETITEM ; writes a collection element
            SetItem = 0xc4, "SETITEM" => Fixed(0), 270000,
            /// NEWARRAY ; creates an array of n nulls
            NewArray = 0xc5, "NEWARRAY" => Fixed(0), 15000,
            /// NEWSTRUCT ; creates a struct of n nulls
            NewStruct = 0xc6, "NEWSTRUCT" => Fixed(0), 15000,
            /// NEWMAP ; creates an empty map
            NewMap = 0xc7, "NEWMAP" => Fixed(0), 200,
            /// APPEND ; appends to an array
            Append = 0xc8, "APPEND" => Fixed(0), 15000,
            /// REVERSE ; reverses an array in place
            Reverse = 0xc9, "REVERSE" => Fixed(0), 500,
            /// REMOVE ; removes a collection element
            Remove = 0xca, "REMOVE" => Fixed(0), 500,
            /// HASKEY ; tests for a key or index
            HasKey = 0xcb, "HASKEY" => Fixed(0), 270000,
            /// KEYS ; pushes the keys of a map
            Keys = 0xcc, "KEYS" => Fixed(0), 500,
            /// VALUES ; pushes the values of a collection
            Values = 0xcd, "VALUES" => Fixed(0), 7000,
            // =========================
            // Exceptions
            // =========================
            /// THROW ; faults the VM
            Throw = 0xf0, "THROW" => Fixed(0), 30,
            /// THROWIFNOT ; faults the VM if top is false
            ThrowIfNot = 0xf1, "THROWIFNOT" => Fixed(0), 30,
        }
    };
}

#[macro_export]
macro_rules! define_opcodes {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:literal, $mnemonic:literal => $size:ident($len:literal), $price:literal
        ),* $(,)?
    ) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        #[repr(u8)]
        pub enum OpCode {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl TryFrom<u8> for OpCode {
            type Error = EncodingError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $opcode => Ok(OpCode::$name), )*
                    _ => Err(EncodingError::UnknownOpcode {
                        opcode: value,
                        offset: 0,
                    }),
                }
            }
        }

        impl OpCode {
            /// Every opcode, in byte order.
            pub const ALL: &'static [OpCode] = &[ $( OpCode::$name, )* ];

            /// Returns the assembly mnemonic for this opcode.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( OpCode::$name => $mnemonic, )*
                }
            }

            /// Returns the operand layout that follows this opcode.
            pub const fn operand_size(&self) -> OperandSize {
                match self {
                    $( OpCode::$name => OperandSize::$size($len), )*
                }
            }

            /// Returns the static execution price in base units.
            pub const fn price(&self) -> i64 {
                match self {
                    $( OpCode::$name => $price, )*
                }
            }

            /// Looks an opcode up by mnemonic. `PUSHF`/`PUSHT` alias `PUSH0`/`PUSH1`.
            pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
                match mnemonic {
                    "PUSHF" => Some(OpCode::Push0),
                    "PUSHT" => Some(OpCode::Push1),
                    $( $mnemonic => Some(OpCode::$name), )*
                    _ => None,
                }
            }
        }
    };
}

for_each_opcode!(define_opcodes);

impl OpCode {
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Opcode pushing a small integer in `-1..=16`.
    pub fn for_small_int(value: i64) -> Option<Self> {
        match value {
            -1 => Some(OpCode::PushM1),
            0 => Some(OpCode::Push0),
            1..=16 => OpCode::try_from(OpCode::PushNull.byte() + value as u8).ok(),
            _ => None,
        }
    }

    /// Inverse of [`OpCode::for_small_int`].
    pub fn small_int_value(self) -> Option<i64> {
        match self {
            OpCode::PushM1 => Some(-1),
            OpCode::Push0 => Some(0),
            op if (OpCode::Push1.byte()..=OpCode::Push16.byte()).contains(&op.byte()) => {
                Some((op.byte() - OpCode::PushNull.byte()) as i64)
            }
            _ => None,
        }
    }

    /// True for opcodes whose operand is data pushed onto the stack.
    pub fn is_push_data(self) -> bool {
        self.byte() <= OpCode::PushData4.byte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_try_from_invalid() {
        assert!(matches!(
            OpCode::try_from(0x67),
            Err(EncodingError::UnknownOpcode { opcode: 0x67, .. })
        ));
        assert!(OpCode::try_from(0xff).is_err());
    }

    #[test]
    fn byte_roundtrip_for_every_opcode() {
        for op in OpCode::ALL {
            assert_eq!(OpCode::try_from(op.byte()).unwrap(), *op);
            assert_eq!(OpCode::from_mnemonic(op.mnemonic()), Some(*op));
        }
    }

    #[test]
    fn operand_sizes() {
        assert_eq!(OpCode::Push0.operand_size(), OperandSize::Fixed(0));
        assert_eq!(OpCode::PushBytes33.operand_size(), OperandSize::Fixed(33));
        assert_eq!(OpCode::PushBytes75.operand_size(), OperandSize::Fixed(75));
        assert_eq!(OpCode::PushData2.operand_size(), OperandSize::Prefixed(2));
        assert_eq!(OpCode::SysCall.operand_size(), OperandSize::Fixed(4));
        assert_eq!(OpCode::JmpIfNot.operand_size(), OperandSize::Fixed(4));
    }

    #[test]
    fn pushbytes_length_matches_byte() {
        for n in 1u8..=75 {
            let op = OpCode::try_from(n).unwrap();
            assert_eq!(op.operand_size(), OperandSize::Fixed(n as usize));
        }
    }

    #[test]
    fn small_ints() {
        assert_eq!(OpCode::for_small_int(-1), Some(OpCode::PushM1));
        assert_eq!(OpCode::for_small_int(0), Some(OpCode::Push0));
        assert_eq!(OpCode::for_small_int(1), Some(OpCode::Push1));
        assert_eq!(OpCode::for_small_int(16), Some(OpCode::Push16));
        assert_eq!(OpCode::for_small_int(17), None);
        assert_eq!(OpCode::for_small_int(-2), None);
        for v in -1..=16 {
            let op = OpCode::for_small_int(v).unwrap();
            assert_eq!(op.small_int_value(), Some(v));
        }
        assert_eq!(OpCode::PushNull.small_int_value(), None);
    }

    #[test]
    fn prices() {
        assert_eq!(OpCode::PushBytes33.price(), 120);
        assert_eq!(OpCode::Push2.price(), 30);
        assert_eq!(OpCode::SysCall.price(), 0);
        assert_eq!(OpCode::PushData4.price(), 110_000);
    }

    #[test]
    fn mnemonic_aliases() {
        assert_eq!(OpCode::from_mnemonic("PUSHT"), Some(OpCode::Push1));
        assert_eq!(OpCode::from_mnemonic("PUSHF"), Some(OpCode::Push0));
        assert_eq!(OpCode::from_mnemonic("BOGUS"), None);
    }
}
