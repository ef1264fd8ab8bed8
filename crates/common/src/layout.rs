//! Typed parameter records for the world-facing opcodes.
//!
//! Each record is decoded straight from an [`Instruction`] whose opcode has
//! the matching layout. Decoding the wrong opcode reads past its width and
//! panics, so callers match on the opcode first.

use crate::instruction::Instruction;

/// Sequential little-endian reader over an instruction's parameters.
struct Fields<'a> {
    instr: &'a Instruction<'a>,
    pos: usize,
}

impl<'a> Fields<'a> {
    fn new(instr: &'a Instruction<'a>) -> Self {
        // Skip the opcode byte.
        Self { instr, pos: 1 }
    }

    fn u8(&mut self) -> u8 {
        let v = self.instr.u8_at(self.pos);
        self.pos += 1;
        v
    }

    fn u16(&mut self) -> u16 {
        let v = self.instr.u16_at(self.pos);
        self.pos += 2;
        v
    }

    fn i16(&mut self) -> i16 {
        self.u16() as i16
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    fn shape<S: Shape>(&mut self) -> S {
        let shape = S::read_at(self.instr, self.pos);
        self.pos += S::WIDTH;
        shape
    }

    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        for b in out.iter_mut() {
            *b = self.u8();
        }
        out
    }
}

/// A point on the floor plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i16,
    pub z: i16,
}

/// Axis-aligned trigger footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i16,
    pub z: i16,
    pub width: u16,
    pub depth: u16,
}

/// Four-corner trigger footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quad {
    pub corners: [Point; 4],
}

/// Footprint encodings shared by the plain and 4-point trigger opcodes.
pub trait Shape: Sized {
    /// Encoded size in bytes.
    const WIDTH: usize;

    /// Read the footprint starting at `offset` within the instruction.
    fn read_at(instr: &Instruction<'_>, offset: usize) -> Self;
}

impl Shape for Rect {
    const WIDTH: usize = 8;

    fn read_at(instr: &Instruction<'_>, offset: usize) -> Self {
        Rect {
            x: instr.i16_at(offset),
            z: instr.i16_at(offset + 2),
            width: instr.u16_at(offset + 4),
            depth: instr.u16_at(offset + 6),
        }
    }
}

impl Shape for Quad {
    const WIDTH: usize = 16;

    fn read_at(instr: &Instruction<'_>, offset: usize) -> Self {
        let mut corners = [Point::default(); 4];
        for (i, corner) in corners.iter_mut().enumerate() {
            corner.x = instr.i16_at(offset + i * 4);
            corner.z = instr.i16_at(offset + i * 4 + 2);
        }
        Quad { corners }
    }
}

/// Fields common to every trigger ("AOT") opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AotHeader {
    /// Trigger slot id.
    pub aot: u8,
    /// Trigger kind (door, item, message, ...).
    pub sce: u8,
    /// Activation flags.
    pub sat: u8,
    pub floor: u8,
    pub super_id: u8,
}

impl AotHeader {
    fn read(fields: &mut Fields<'_>) -> Self {
        AotHeader {
            aot: fields.u8(),
            sce: fields.u8(),
            sat: fields.u8(),
            floor: fields.u8(),
            super_id: fields.u8(),
        }
    }
}

/// `AOT_SET` / `AOT_SET_4P`: a generic trigger area with six bytes of payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaTrigger<S> {
    pub header: AotHeader,
    pub shape: S,
    pub data: [u8; 6],
}

impl<S: Shape> AreaTrigger<S> {
    pub fn decode(instr: &Instruction<'_>) -> Self {
        let mut f = Fields::new(instr);
        AreaTrigger {
            header: AotHeader::read(&mut f),
            shape: f.shape(),
            data: f.array(),
        }
    }
}

/// Where a door leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DoorDestination {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub dir: i16,
    pub stage: u8,
    pub room: u8,
    pub camera: u8,
    pub floor: u8,
    pub texture_type: u8,
    pub door_type: u8,
    pub knock: u8,
    pub key_id: u8,
    pub key_type: u8,
    pub free: u8,
}

/// `DOOR_AOT_SE` / `DOOR_AOT_SET_4P`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorTrigger<S> {
    pub header: AotHeader,
    pub shape: S,
    pub destination: DoorDestination,
}

impl<S: Shape> DoorTrigger<S> {
    pub fn decode(instr: &Instruction<'_>) -> Self {
        let mut f = Fields::new(instr);
        let header = AotHeader::read(&mut f);
        let shape = f.shape();
        let destination = DoorDestination {
            x: f.i16(),
            y: f.i16(),
            z: f.i16(),
            dir: f.i16(),
            stage: f.u8(),
            room: f.u8(),
            camera: f.u8(),
            floor: f.u8(),
            texture_type: f.u8(),
            door_type: f.u8(),
            knock: f.u8(),
            key_id: f.u8(),
            key_type: f.u8(),
            free: f.u8(),
        };
        DoorTrigger {
            header,
            shape,
            destination,
        }
    }
}

/// What an item trigger hands to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemPlacement {
    pub item_id: u16,
    pub amount: u16,
    /// Bit index recording whether the item was already picked up.
    pub pickup_flag: u16,
    pub model_id: u8,
    pub action: u8,
}

/// `ITEM_AOT_SET` / `ITEM_AOT_SET_4P`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTrigger<S> {
    pub header: AotHeader,
    pub shape: S,
    pub item: ItemPlacement,
}

impl<S: Shape> ItemTrigger<S> {
    pub fn decode(instr: &Instruction<'_>) -> Self {
        let mut f = Fields::new(instr);
        let header = AotHeader::read(&mut f);
        let shape = f.shape();
        let item = ItemPlacement {
            item_id: f.u16(),
            amount: f.u16(),
            pickup_flag: f.u16(),
            model_id: f.u8(),
            action: f.u8(),
        };
        ItemTrigger {
            header,
            shape,
            item,
        }
    }
}

/// `AOT_RESET`: re-arm an existing trigger with new kind and payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerReset {
    pub aot: u8,
    pub sce: u8,
    pub sat: u8,
    pub data: [u8; 6],
}

impl TriggerReset {
    pub fn decode(instr: &Instruction<'_>) -> Self {
        let mut f = Fields::new(instr);
        TriggerReset {
            aot: f.u8(),
            sce: f.u8(),
            sat: f.u8(),
            data: f.array(),
        }
    }
}

/// `SCE_EM_SET`: place an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemySpawn {
    pub aot: u8,
    pub model: u8,
    pub pose: u8,
    pub behavior: u8,
    pub floor: u8,
    pub sound_bank: u8,
    pub texture: u8,
    /// Bit index marking the enemy as dead.
    pub kill_id: u8,
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub dir: i16,
    pub motion: u16,
    pub control_flags: u16,
}

impl EnemySpawn {
    pub fn decode(instr: &Instruction<'_>) -> Self {
        let mut f = Fields::new(instr);
        f.skip(1);
        EnemySpawn {
            aot: f.u8(),
            model: f.u8(),
            pose: f.u8(),
            behavior: f.u8(),
            floor: f.u8(),
            sound_bank: f.u8(),
            texture: f.u8(),
            kill_id: f.u8(),
            x: f.i16(),
            y: f.i16(),
            z: f.i16(),
            dir: f.i16(),
            motion: f.u16(),
            control_flags: f.u16(),
        }
    }
}

/// `SCE_ESPR_ON`: spawn a script-driven sprite effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSpawn {
    pub id: u8,
    pub kind: u8,
    pub flags: u16,
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub dir: i16,
}

impl SpriteSpawn {
    pub fn decode(instr: &Instruction<'_>) -> Self {
        let mut f = Fields::new(instr);
        f.skip(1);
        SpriteSpawn {
            id: f.u8(),
            kind: f.u8(),
            flags: f.u16(),
            x: f.i16(),
            y: f.i16(),
            z: f.i16(),
            dir: f.i16(),
        }
    }
}

/// `POS_SET`: a world position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Position {
    pub fn decode(instr: &Instruction<'_>) -> Self {
        let mut f = Fields::new(instr);
        f.skip(1);
        Position {
            x: f.i16(),
            y: f.i16(),
            z: f.i16(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    fn decode(code: &[u8]) -> Instruction<'_> {
        Instruction::decode_at(code, 0).unwrap()
    }

    #[test]
    fn area_trigger_rect() {
        let code = [
            0x2c, 0x01, 0x02, 0x03, 0x00, 0x00, // header
            0x10, 0x00, 0xf0, 0xff, 0x00, 0x02, 0x80, 0x01, // x, z, w, d
            1, 2, 3, 4, 5, 6, // data
        ];
        let instr = decode(&code);
        assert_eq!(instr.opcode, Opcode::AotSet);
        let t = AreaTrigger::<Rect>::decode(&instr);
        assert_eq!(t.header.aot, 1);
        assert_eq!(t.header.sce, 2);
        assert_eq!(t.header.sat, 3);
        assert_eq!(
            t.shape,
            Rect {
                x: 16,
                z: -16,
                width: 512,
                depth: 384
            }
        );
        assert_eq!(t.data, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn area_trigger_quad() {
        let mut code = vec![0x67, 0x04, 0x01, 0x00, 0x00, 0x00];
        for v in [1i16, 2, 3, 4, 5, 6, 7, 8] {
            code.extend_from_slice(&v.to_le_bytes());
        }
        code.extend_from_slice(&[9, 9, 9, 9, 9, 9]);
        let instr = decode(&code);
        let t = AreaTrigger::<Quad>::decode(&instr);
        assert_eq!(t.header.aot, 4);
        assert_eq!(t.shape.corners[0], Point { x: 1, z: 2 });
        assert_eq!(t.shape.corners[3], Point { x: 7, z: 8 });
        assert_eq!(t.data, [9; 6]);
    }

    #[test]
    fn door_trigger_destination() {
        let mut code = vec![0x3b, 0x02, 0x01, 0x00, 0x00, 0x00];
        code.extend_from_slice(&[0; 8]); // rect
        for v in [100i16, -200, 300, 1024] {
            code.extend_from_slice(&v.to_le_bytes());
        }
        code.extend_from_slice(&[1, 0x0a, 3, 0, 0, 0, 0, 0x2f, 0, 0]);
        let instr = decode(&code);
        let door = DoorTrigger::<Rect>::decode(&instr);
        assert_eq!(door.destination.x, 100);
        assert_eq!(door.destination.y, -200);
        assert_eq!(door.destination.dir, 1024);
        assert_eq!(door.destination.stage, 1);
        assert_eq!(door.destination.room, 0x0a);
        assert_eq!(door.destination.camera, 3);
        assert_eq!(door.destination.key_id, 0x2f);
    }

    #[test]
    fn item_trigger_placement() {
        let mut code = vec![0x4e, 0x05, 0x02, 0x00, 0x00, 0x00];
        code.extend_from_slice(&[0; 8]);
        for v in [0x13u16, 15, 42] {
            code.extend_from_slice(&v.to_le_bytes());
        }
        code.extend_from_slice(&[7, 1]);
        let instr = decode(&code);
        let item = ItemTrigger::<Rect>::decode(&instr);
        assert_eq!(item.header.aot, 5);
        assert_eq!(item.item.item_id, 0x13);
        assert_eq!(item.item.amount, 15);
        assert_eq!(item.item.pickup_flag, 42);
        assert_eq!(item.item.model_id, 7);
    }

    #[test]
    fn trigger_reset_fields() {
        let code = [0x46, 0x03, 0x08, 0x01, 1, 2, 3, 4, 5, 6];
        let reset = TriggerReset::decode(&decode(&code));
        assert_eq!(
            reset,
            TriggerReset {
                aot: 3,
                sce: 8,
                sat: 1,
                data: [1, 2, 3, 4, 5, 6]
            }
        );
    }

    #[test]
    fn sprite_spawn_fields() {
        let mut code = vec![0x3a, 0x00, 0x04, 0x02, 0x10, 0x00];
        for v in [-100i16, 50, 25, 2048] {
            code.extend_from_slice(&v.to_le_bytes());
        }
        code.extend_from_slice(&[0, 0]);
        let instr = decode(&code);
        assert_eq!(instr.opcode, Opcode::SceEsprOn);
        let sprite = SpriteSpawn::decode(&instr);
        assert_eq!(sprite.id, 4);
        assert_eq!(sprite.kind, 2);
        assert_eq!(sprite.flags, 0x10);
        assert_eq!((sprite.x, sprite.y, sprite.z), (-100, 50, 25));
        assert_eq!(sprite.dir, 2048);
    }

    #[test]
    fn enemy_spawn_fields() {
        let mut code = vec![0x44, 0x00, 0x07, 0x15, 0x00, 0x02, 0x01, 0x03, 0x00, 0x40];
        for v in [-1500i16, 0, 3200, -1024] {
            code.extend_from_slice(&v.to_le_bytes());
        }
        for v in [5u16, 0x0101] {
            code.extend_from_slice(&v.to_le_bytes());
        }
        let instr = decode(&code);
        assert_eq!(instr.opcode, Opcode::SceEmSet);
        let enemy = EnemySpawn::decode(&instr);
        assert_eq!(enemy.aot, 7);
        assert_eq!(enemy.model, 0x15);
        assert_eq!(enemy.behavior, 0x02);
        assert_eq!(enemy.floor, 0x01);
        assert_eq!(enemy.sound_bank, 0x03);
        assert_eq!(enemy.kill_id, 0x40);
        assert_eq!((enemy.x, enemy.y, enemy.z), (-1500, 0, 3200));
        assert_eq!(enemy.dir, -1024);
        assert_eq!(enemy.motion, 5);
        assert_eq!(enemy.control_flags, 0x0101);
    }

    #[test]
    fn position_fields() {
        let code = [0x32, 0x00, 0xe8, 0x03, 0x00, 0x00, 0x18, 0xfc];
        let pos = Position::decode(&decode(&code));
        assert_eq!(
            pos,
            Position {
                x: 1000,
                y: 0,
                z: -1000
            }
        );
    }
}
