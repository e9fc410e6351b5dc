use crate::models::common::{Direction, EntityKind, Point3, RobotState};
use crate::models::movement::{AerialMovement, GroundMovement, Movement};
use crate::models::traits::IOccupant;

/// ロボットエージェント（ポイントエンティティ）
///
/// グリッド上の1セルを占有する可動エンティティです。移動規則は構築時に
/// 種別に応じた検証器（Movement）として決定され、ロボット自身が保持します。
/// 位置フィールドは World::move_entity の成功時にのみ更新され、それ以外の
/// 経路で書き換えてはなりません。
#[derive(Debug, Clone)]
pub struct Robot {
    /// ロボットの一意識別子
    pub id: String,
    /// 表示記号（1文字）
    pub symbol: char,
    /// 説明文
    pub description: String,
    /// 現在位置
    pub position: Point3,
    /// 動作状態
    pub state: RobotState,
    /// 向き（初期値は北、以降は自由）
    pub direction: Direction,
    /// 搭載センサー名のリスト（本エンジンでは内容を解釈しない）
    pub sensors: Vec<String>,
    /// 種別ごとの移動検証器
    pub movement: Movement,
}

impl Robot {
    /// 地上ロボットを作成
    ///
    /// # 引数
    ///
    /// * `id` - ロボットの一意識別子
    /// * `symbol` - 表示記号
    /// * `description` - 説明文
    /// * `position` - 初期位置
    /// * `max_speed_cells` - 1ステップで移動できる最大平面距離（セル）
    pub fn ground(
        id: String,
        symbol: char,
        description: String,
        position: Point3,
        max_speed_cells: f64,
    ) -> Self {
        Self {
            id,
            symbol,
            description,
            position,
            state: RobotState::Off, // power_onまで電源OFF
            direction: Direction::North,
            sensors: Vec::new(),
            movement: Movement::Ground(GroundMovement::new(max_speed_cells)),
        }
    }

    /// 飛行ロボットを作成
    ///
    /// # 引数
    ///
    /// * `id` - ロボットの一意識別子
    /// * `symbol` - 表示記号
    /// * `description` - 説明文
    /// * `position` - 初期位置
    /// * `min_altitude` - 最低飛行高度（セル）
    /// * `max_altitude` - 最高飛行高度（セル）
    pub fn aerial(
        id: String,
        symbol: char,
        description: String,
        position: Point3,
        min_altitude: i32,
        max_altitude: i32,
    ) -> Self {
        Self {
            id,
            symbol,
            description,
            position,
            state: RobotState::Off,
            direction: Direction::North,
            sensors: Vec::new(),
            movement: Movement::Aerial(AerialMovement::new(min_altitude, max_altitude)),
        }
    }

    /// 電源を入れる
    pub fn power_on(&mut self) {
        if self.state == RobotState::Off {
            self.state = RobotState::On;
        }
    }

    /// 電源を切る
    pub fn power_off(&mut self) {
        self.state = RobotState::Off;
    }

    /// 動作状態を遷移させる
    ///
    /// 電源OFF中は遷移を受け付けません（power_onで復帰させてください）。
    pub fn set_state(&mut self, state: RobotState) {
        if self.state != RobotState::Off {
            self.state = state;
        }
    }

    /// 向きを変更
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// センサーを搭載
    pub fn attach_sensor(&mut self, name: String) {
        self.sensors.push(name);
    }

    /// 電源OFF状態かどうか
    pub fn is_off(&self) -> bool {
        self.state == RobotState::Off
    }

    /// 地上ロボットかどうか
    pub fn is_ground(&self) -> bool {
        matches!(self.movement, Movement::Ground(_))
    }

    /// 飛行ロボットかどうか
    pub fn is_aerial(&self) -> bool {
        matches!(self.movement, Movement::Aerial(_))
    }
}

impl IOccupant for Robot {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Robot
    }

    fn symbol(&self) -> char {
        self.symbol
    }

    fn claimed_cells(&self) -> Vec<Point3> {
        vec![self.position]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_robot() -> Robot {
        Robot::ground(
            "R001".to_string(),
            'R',
            "テスト用地上ロボット".to_string(),
            Point3::new(0, 0, 0),
            3.0,
        )
    }

    #[test]
    fn test_power_transitions() {
        let mut robot = test_robot();
        assert!(robot.is_off());

        robot.power_on();
        assert_eq!(robot.state, RobotState::On);

        robot.power_off();
        assert!(robot.is_off());
    }

    #[test]
    fn test_set_state_rejected_while_off() {
        let mut robot = test_robot();
        robot.set_state(RobotState::Moving);
        assert!(robot.is_off());

        robot.power_on();
        robot.set_state(RobotState::Moving);
        assert_eq!(robot.state, RobotState::Moving);
    }

    #[test]
    fn test_kind_helpers() {
        let ground = test_robot();
        assert!(ground.is_ground());
        assert!(!ground.is_aerial());

        let aerial = Robot::aerial(
            "A001".to_string(),
            'A',
            "テスト用飛行ロボット".to_string(),
            Point3::new(0, 0, 5),
            0,
            50,
        );
        assert!(aerial.is_aerial());
    }

    #[test]
    fn test_claimed_cells_is_single_position() {
        let robot = test_robot();
        assert_eq!(robot.claimed_cells(), vec![Point3::new(0, 0, 0)]);
    }

    #[test]
    fn test_attach_sensor_is_opaque() {
        let mut robot = test_robot();
        robot.attach_sensor("温度センサー".to_string());
        robot.attach_sensor("測距センサー".to_string());
        assert_eq!(robot.sensors.len(), 2);
    }
}
