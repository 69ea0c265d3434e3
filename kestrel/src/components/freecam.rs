use crate::components::Component;
use crate::core::GameObjectId;
use crate::math;
use crate::world::World;
use nalgebra::Vector3;
use winit::keyboard::KeyCode;

const ROLL_SPEED: f32 = 90.0; // degrees per second

/// Fly-camera controls.
///
/// W/S move along the view direction, A/D strafe, Space and left Ctrl move
/// vertically, Q/E roll. Mouse-look is active while the cursor is captured;
/// M toggles the capture.
#[derive(Debug, Clone)]
pub struct FreecamController {
    pub move_speed: f32,
    pub look_sensitivity: f32,
}

impl Default for FreecamController {
    fn default() -> Self {
        FreecamController {
            move_speed: 6.0,
            look_sensitivity: 0.5,
        }
    }
}

impl Component for FreecamController {
    fn update(&mut self, world: &mut World, parent: GameObjectId) {
        if world.input.is_key_released(KeyCode::KeyM) {
            if world.input.is_cursor_locked() {
                world.input.unlock_cursor();
            } else {
                world.input.lock_cursor();
            }
        }

        let delta_time = world.delta_time().as_secs_f32();
        let input = &world.input;

        let mut fb_movement: f32 = 0.0;
        if input.is_key_pressed(KeyCode::KeyW) {
            fb_movement += 1.0;
        }
        if input.is_key_pressed(KeyCode::KeyS) {
            fb_movement -= 1.0;
        }

        let mut lr_movement: f32 = 0.0;
        if input.is_key_pressed(KeyCode::KeyA) {
            lr_movement -= 1.0;
        }
        if input.is_key_pressed(KeyCode::KeyD) {
            lr_movement += 1.0;
        }

        let mut ud_movement: f32 = 0.0;
        if input.is_key_pressed(KeyCode::Space) {
            ud_movement = 1.0;
        }
        if input.is_key_pressed(KeyCode::ControlLeft) {
            ud_movement = -1.0;
        }

        let mut roll: f32 = 0.0;
        if input.is_key_pressed(KeyCode::KeyQ) {
            roll -= 1.0;
        }
        if input.is_key_pressed(KeyCode::KeyE) {
            roll += 1.0;
        }

        let look = if input.is_cursor_locked() {
            input.mouse_delta() * self.look_sensitivity
        } else {
            nalgebra::Vector2::zeros()
        };

        let Some(object) = world.get_object_mut(parent) else {
            return;
        };

        let rot = math::rotation_deg(object.transform.orientation());
        let right = Vector3::new(rot[(0, 0)], rot[(0, 1)], rot[(0, 2)]);
        let up = Vector3::new(rot[(1, 0)], rot[(1, 1)], rot[(1, 2)]);
        let forward = -Vector3::new(rot[(2, 0)], rot[(2, 1)], rot[(2, 2)]);

        let offset = (forward * fb_movement + right * lr_movement + up * ud_movement)
            * self.move_speed
            * delta_time;
        if offset != Vector3::zeros() {
            object.transform.translate(offset);
        }

        let rotation = Vector3::new(look.y, look.x, roll * ROLL_SPEED * delta_time);
        if rotation != Vector3::zeros() {
            object.transform.rotate(rotation);
        }
    }
}
