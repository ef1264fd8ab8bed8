//! Opcode definitions and the instruction width table.
//!
//! The opcode byte alone determines how many bytes an instruction occupies,
//! so the table below is what lets the interpreter step from one instruction
//! to the next without understanding its parameters.

use crate::error::DecodeError;

macro_rules! opcode_table {
    ($( $(#[$doc:meta])* $name:ident = $byte:literal, $width:literal, $mnemonic:literal; )*) => {
        /// Identifies the operation to perform.
        ///
        /// The `#[repr(u8)]` attribute pins each variant to its byte value in
        /// the script format.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Opcode {
            $( $(#[$doc])* $name = $byte, )*
        }

        /// All valid opcodes, in byte order. Useful for exhaustive testing.
        pub const ALL_OPCODES: &[Opcode] = &[ $( Opcode::$name, )* ];

        impl TryFrom<u8> for Opcode {
            type Error = DecodeError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $byte => Ok(Opcode::$name), )*
                    _ => Err(DecodeError::UnknownOpcode(value)),
                }
            }
        }

        impl Opcode {
            /// Total encoded width of the instruction in bytes, opcode included.
            pub const fn width(self) -> usize {
                match self {
                    $( Opcode::$name => $width, )*
                }
            }

            /// Returns the mnemonic for this opcode, for log output.
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $( Opcode::$name => $mnemonic, )*
                }
            }
        }
    };
}

opcode_table! {
    Nop = 0x00, 1, "NOP";
    /// End of event. Returns from a subroutine, or kills the thread at call level 0.
    EvtEnd = 0x01, 2, "EVT_END";
    EvtNext = 0x02, 1, "EVT_NEXT";
    EvtChain = 0x03, 4, "EVT_CHAIN";
    /// Start an event on a thread slot (0xFF picks the first dead slot).
    EvtExec = 0x04, 4, "EVT_EXEC";
    EvtKill = 0x05, 2, "EVT_KILL";
    /// Open a conditional block. arg: block length (u16 at offset 2).
    IfStart = 0x06, 4, "IFEL_CK";
    ElseStart = 0x07, 4, "ELSE_CK";
    EndIf = 0x08, 2, "ENDIF";
    /// Arm a tick countdown. arg: tick count (u16 at offset 2).
    Sleep = 0x09, 4, "SLEEP";
    /// Yield until the countdown armed by `Sleep` runs out.
    Sleeping = 0x0a, 3, "SLEEPING";
    Wsleep = 0x0b, 1, "WSLEEP";
    Wsleeping = 0x0c, 1, "WSLEEPING";
    /// Counted loop. args: block length (u16 at 2), count (u16 at 4).
    For = 0x0d, 6, "FOR";
    ForEnd = 0x0e, 2, "NEXT";
    WhileStart = 0x0f, 4, "WHILE";
    WhileEnd = 0x10, 2, "EWHILE";
    DoStart = 0x11, 4, "DO";
    DoEnd = 0x12, 2, "EDWHILE";
    /// Multi-way branch on a variable. args: variable (u8 at 1), block length (u16 at 2).
    Switch = 0x13, 4, "SWITCH";
    Case = 0x14, 6, "CASE";
    Default = 0x15, 2, "DEFAULT";
    EndSwitch = 0x16, 2, "ESWITCH";
    /// Unconditional jump. Never taken by the interpreter.
    Goto = 0x17, 6, "GOTO";
    /// Call another event as a subroutine. arg: event (u8 at 1).
    Gosub = 0x18, 2, "GOSUB";
    Return = 0x19, 2, "RETURN";
    Break = 0x1a, 2, "BREAK";
    For2 = 0x1b, 6, "FOR2";
    BreakPoint = 0x1c, 1, "BREAK_POINT";
    WorkCopy = 0x1d, 4, "WORK_COPY";
    Nop1e = 0x1e, 1, "NOP_1E";
    Nop1f = 0x1f, 1, "NOP_1F";
    Nop20 = 0x20, 1, "NOP_20";
    /// Test a flag bit. args: array, bit, expected value.
    CheckBit = 0x21, 4, "CK";
    /// Mutate a flag bit. args: array, bit, operation.
    SetBit = 0x22, 4, "SET";
    /// Compare a variable with a literal. args: variable (2), operator (3), value (i16 at 4).
    Compare = 0x23, 6, "CMP";
    Save = 0x24, 4, "SAVE";
    Copy = 0x25, 3, "COPY";
    Calc = 0x26, 6, "CALC";
    Calc2 = 0x27, 4, "CALC2";
    SceRnd = 0x28, 1, "SCE_RND";
    /// Switch to another fixed camera. arg: camera id.
    CutChg = 0x29, 2, "CUT_CHG";
    CutOld = 0x2a, 1, "CUT_OLD";
    MessageOn = 0x2b, 6, "MESSAGE_ON";
    AotSet = 0x2c, 20, "AOT_SET";
    ObjModelSet = 0x2d, 38, "OBJ_MODEL_SET";
    /// Select the object later opcodes act upon. args: component kind, index.
    WorkSet = 0x2e, 3, "WORK_SET";
    SpeedSet = 0x2f, 4, "SPEED_SET";
    AddSpeed = 0x30, 1, "ADD_SPEED";
    AddAspeed = 0x31, 1, "ADD_ASPEED";
    PosSet = 0x32, 8, "POS_SET";
    DirSet = 0x33, 8, "DIR_SET";
    MemberSet = 0x34, 4, "MEMBER_SET";
    MemberSet2 = 0x35, 3, "MEMBER_SET2";
    SeOn = 0x36, 12, "SE_ON";
    ScaIdSet = 0x37, 4, "SCA_ID_SET";
    FlrSet = 0x38, 3, "FLR_SET";
    DirCk = 0x39, 8, "DIR_CK";
    SceEsprOn = 0x3a, 16, "SCE_ESPR_ON";
    DoorAotSet = 0x3b, 32, "DOOR_AOT_SE";
    CutAuto = 0x3c, 2, "CUT_AUTO";
    MemberCopy = 0x3d, 3, "MEMBER_COPY";
    MemberCmp = 0x3e, 6, "MEMBER_CMP";
    PlcMotion = 0x3f, 4, "PLC_MOTION";
    PlcDest = 0x40, 8, "PLC_DEST";
    PlcNeck = 0x41, 10, "PLC_NECK";
    PlcRet = 0x42, 1, "PLC_RET";
    PlcFlg = 0x43, 4, "PLC_FLG";
    SceEmSet = 0x44, 22, "SCE_EM_SET";
    ColChgSet = 0x45, 5, "COL_CHG_SET";
    AotReset = 0x46, 10, "AOT_RESET";
    AotOn = 0x47, 2, "AOT_ON";
    SuperSet = 0x48, 16, "SUPER_SET";
    SuperReset = 0x49, 8, "SUPER_RESET";
    PlcGun = 0x4a, 2, "PLC_GUN";
    CutReplace = 0x4b, 3, "CUT_REPLACE";
    SceEsprKill = 0x4c, 5, "SCE_ESPR_KILL";
    DoorModelSet = 0x4d, 22, "DOOR_MODEL_SET";
    ItemAotSet = 0x4e, 22, "ITEM_AOT_SET";
    SceKeyCk = 0x4f, 4, "SCE_KEY_CK";
    SceTrgCk = 0x50, 4, "SCE_TRG_CK";
    SceBgmControl = 0x51, 6, "SCE_BGM_CONTROL";
    SceEsprControl = 0x52, 6, "SCE_ESPR_CONTROL";
    SceFadeSet = 0x53, 6, "SCE_FADE_SET";
    SceEspr3dOn = 0x54, 22, "SCE_ESPR3D_ON";
    MemberCalc = 0x55, 6, "MEMBER_CALC";
    MemberCalc2 = 0x56, 4, "MEMBER_CALC2";
    SceBgmtblSet = 0x57, 8, "SCE_BGMTBL_SET";
    PlcRot = 0x58, 4, "PLC_ROT";
    XaOn = 0x59, 4, "XA_ON";
    WeaponChg = 0x5a, 2, "WEAPON_CHG";
    PlcCnt = 0x5b, 2, "PLC_CNT";
    SceShakeOn = 0x5c, 3, "SCE_SHAKE_ON";
    MizuDivSet = 0x5d, 2, "MIZU_DIV_SET";
    KeepItemCk = 0x5e, 2, "KEEP_ITEM_CK";
    XaVol = 0x5f, 2, "XA_VOL";
    KageSet = 0x60, 14, "KAGE_SET";
    CutBeSet = 0x61, 4, "CUT_BE_SET";
    SceItemLost = 0x62, 2, "SCE_ITEM_LOST";
    PlcGunEff = 0x63, 1, "PLC_GUN_EFF";
    SceEsprOn2 = 0x64, 16, "SCE_ESPR_ON2";
    SceEsprKill2 = 0x65, 2, "SCE_ESPR_KILL2";
    PlcStop = 0x66, 1, "PLC_STOP";
    AotSet4p = 0x67, 28, "AOT_SET_4P";
    DoorAotSet4p = 0x68, 40, "DOOR_AOT_SET_4P";
    ItemAotSet4p = 0x69, 30, "ITEM_AOT_SET_4P";
    LightPosSet = 0x6a, 6, "LIGHT_POS_SET";
    LightKidoSet = 0x6b, 4, "LIGHT_KIDO_SET";
    RbjReset = 0x6c, 1, "RBJ_RESET";
    SceScrMove = 0x6d, 4, "SCE_SCR_MOVE";
    PartsSet = 0x6e, 6, "PARTS_SET";
    MovieOn = 0x6f, 2, "MOVIE_ON";
    SplcRet = 0x70, 1, "SPLC_RET";
    SplcSce = 0x71, 1, "SPLC_SCE";
    SuperOn = 0x72, 16, "SUPER_ON";
    MirrorSet = 0x73, 8, "MIRROR_SET";
    SceFadeAdjust = 0x74, 4, "SCE_FADE_ADJUST";
    SceEspr3dOn2 = 0x75, 22, "SCE_ESPR3D_ON2";
    SceItemGet = 0x76, 3, "SCE_ITEM_GET";
    SceLineStart = 0x77, 4, "SCE_LINE_START";
    SceLineMain = 0x78, 6, "SCE_LINE_MAIN";
    SceLineEnd = 0x79, 1, "SCE_LINE_END";
    ScePartsBomb = 0x7a, 16, "SCE_PARTS_BOMB";
    ScePartsDown = 0x7b, 16, "SCE_PARTS_DOWN";
    LightColorSet = 0x7c, 6, "LIGHT_COLOR_SET";
    LightPosSet2 = 0x7d, 6, "LIGHT_POS_SET2";
    LightKidoSet2 = 0x7e, 6, "LIGHT_KIDO_SET2";
    LightColorSet2 = 0x7f, 6, "LIGHT_COLOR_SET2";
    SeVol = 0x80, 3, "SE_VOL";
    SceItemCmp = 0x81, 3, "SCE_ITEM_CMP";
    SceEsprTask = 0x82, 3, "SCE_ESPR_TASK";
    PlcHeal = 0x83, 1, "PLC_HEAL";
    StMapHint = 0x84, 2, "ST_MAP_HINT";
    SceEmPosCk = 0x85, 6, "SCE_EM_POS_CK";
    PoisonCk = 0x86, 1, "POISON_CK";
    PoisonClr = 0x87, 1, "POISON_CLR";
    SceItemLost2 = 0x88, 3, "SCE_ITEM_LOST2";
    EvtNext2 = 0x89, 1, "EVT_NEXT2";
    VloopSet = 0x8a, 6, "VLOOP_SET";
    VloopSet2 = 0x8b, 6, "VLOOP_SET2";
}

/// Look up the encoded width of an opcode byte.
///
/// Fails for bytes absent from the table. The dispatch loop handles that case
/// itself; everywhere else an unknown byte means the program is malformed.
pub fn width_of(byte: u8) -> Result<usize, DecodeError> {
    Opcode::try_from(byte).map(Opcode::width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_opcodes_count() {
        assert_eq!(ALL_OPCODES.len(), 0x8c);
    }

    #[test]
    fn table_is_contiguous() {
        for (i, &opcode) in ALL_OPCODES.iter().enumerate() {
            assert_eq!(opcode as usize, i, "gap before {opcode:?}");
        }
    }

    #[test]
    fn roundtrip_all_valid_opcodes() {
        for &opcode in ALL_OPCODES {
            let byte = opcode as u8;
            assert_eq!(Opcode::try_from(byte), Ok(opcode));
        }
    }

    #[test]
    fn bytes_past_table_are_unknown() {
        for byte in 0x8c..=0xFFu8 {
            assert_eq!(
                Opcode::try_from(byte),
                Err(DecodeError::UnknownOpcode(byte)),
                "byte {byte:#04x} should be unknown"
            );
        }
    }

    #[test]
    fn control_flow_widths() {
        assert_eq!(Opcode::EvtEnd.width(), 2);
        assert_eq!(Opcode::EvtExec.width(), 4);
        assert_eq!(Opcode::IfStart.width(), 4);
        assert_eq!(Opcode::ElseStart.width(), 4);
        assert_eq!(Opcode::EndIf.width(), 2);
        assert_eq!(Opcode::Sleep.width(), 4);
        assert_eq!(Opcode::Sleeping.width(), 3);
        assert_eq!(Opcode::For.width(), 6);
        assert_eq!(Opcode::ForEnd.width(), 2);
        assert_eq!(Opcode::Switch.width(), 4);
        assert_eq!(Opcode::Case.width(), 6);
        assert_eq!(Opcode::Goto.width(), 6);
        assert_eq!(Opcode::Gosub.width(), 2);
    }

    #[test]
    fn trigger_widths() {
        assert_eq!(Opcode::AotSet.width(), 20);
        assert_eq!(Opcode::AotSet4p.width(), 28);
        assert_eq!(Opcode::DoorAotSet.width(), 32);
        assert_eq!(Opcode::DoorAotSet4p.width(), 40);
        assert_eq!(Opcode::ItemAotSet.width(), 22);
        assert_eq!(Opcode::ItemAotSet4p.width(), 30);
        assert_eq!(Opcode::AotReset.width(), 10);
    }

    #[test]
    fn width_of_unknown_byte_fails() {
        assert_eq!(width_of(0x90), Err(DecodeError::UnknownOpcode(0x90)));
        assert_eq!(width_of(0x32), Ok(8));
    }

    #[test]
    fn widths_are_nonzero() {
        for &opcode in ALL_OPCODES {
            assert!(opcode.width() >= 1, "zero width for {opcode:?}");
        }
    }

    #[test]
    fn mnemonics_are_uppercase() {
        for &opcode in ALL_OPCODES {
            let m = opcode.mnemonic();
            assert!(!m.is_empty(), "empty mnemonic for {opcode:?}");
            assert_eq!(m, m.to_uppercase(), "mnemonic should be uppercase: {m}");
        }
    }
}
