//! The world-model collaborator and the opcodes that drive it.
//!
//! Handlers here decode their fixed-width parameters, forward exactly one
//! call and let the dispatch loop advance past the instruction. None of them
//! touch control flow.

use scd_common::layout::{
    AreaTrigger, DoorTrigger, EnemySpawn, ItemTrigger, Position, Quad, Rect, SpriteSpawn,
    TriggerReset,
};
use scd_common::{Instruction, Opcode};
use tracing::debug;

use crate::execute::{Dispatcher, Signal};
use crate::thread::{ScriptThread, WorkKind};

/// Game-state mutations requested by scripts.
///
/// Calls are fire-and-forget. Every method defaults to doing nothing so a
/// host only implements what it models.
pub trait World {
    fn change_camera(&mut self, _camera: u8) {}

    fn add_area_trigger(&mut self, _trigger: AreaTrigger<Rect>) {}

    fn add_area_trigger_4p(&mut self, _trigger: AreaTrigger<Quad>) {}

    fn reset_area_trigger(&mut self, _reset: TriggerReset) {}

    fn add_door_trigger(&mut self, _door: DoorTrigger<Rect>) {}

    fn add_door_trigger_4p(&mut self, _door: DoorTrigger<Quad>) {}

    fn add_item_trigger(&mut self, _item: ItemTrigger<Rect>) {}

    fn add_item_trigger_4p(&mut self, _item: ItemTrigger<Quad>) {}

    fn add_script_sprite(&mut self, _sprite: SpriteSpawn) {}

    fn add_enemy(&mut self, _enemy: EnemySpawn) {}

    fn set_player_position(&mut self, _position: Position) {}

    fn remove_collision_entity(&mut self, _id: u8) {}
}

impl<W: World + ?Sized> Dispatcher<'_, W> {
    /// Forward a world-mutation opcode to the collaborator.
    pub(crate) fn exec_world(&mut self, thread: &ScriptThread, instr: &Instruction<'_>) -> Signal {
        let world = &mut *self.world;
        match instr.opcode {
            Opcode::CutChg => world.change_camera(instr.u8_at(1)),
            Opcode::AotSet => world.add_area_trigger(AreaTrigger::decode(instr)),
            Opcode::AotSet4p => world.add_area_trigger_4p(AreaTrigger::decode(instr)),
            Opcode::AotReset => world.reset_area_trigger(TriggerReset::decode(instr)),
            Opcode::DoorAotSet => world.add_door_trigger(DoorTrigger::decode(instr)),
            Opcode::DoorAotSet4p => world.add_door_trigger_4p(DoorTrigger::decode(instr)),
            Opcode::ItemAotSet => world.add_item_trigger(ItemTrigger::decode(instr)),
            Opcode::ItemAotSet4p => world.add_item_trigger_4p(ItemTrigger::decode(instr)),
            Opcode::SceEsprOn => world.add_script_sprite(SpriteSpawn::decode(instr)),
            Opcode::SceEmSet => world.add_enemy(EnemySpawn::decode(instr)),
            Opcode::PosSet => {
                let target = thread.work_target();
                if target.kind == WorkKind::Player {
                    world.set_player_position(Position::decode(instr));
                } else {
                    // Only the player has a position the world model exposes.
                    debug!(?target, "POS_SET on non-player target ignored");
                }
            }
            Opcode::ColChgSet => {
                let id = instr.u8_at(1);
                if instr.u8_at(2) & 0x01 != 0 {
                    world.remove_collision_entity(id);
                }
            }
            // Only the opcodes above are routed here.
            _ => {}
        }
        Signal::Continue
    }
}
