//! # World モジュール
//!
//! ロボット環境シミュレーションの中核となる3次元占有グリッドを提供します。
//!
//! このモジュールは、固定寸法のグリッドに対するエンティティの配置・削除・
//! 移動と、その際の境界チェック・衝突チェックを一手に引き受けます。各セルの
//! 占有タグと登録順のエンティティ一覧を保持し、「同一セルを複数のエンティティ
//! が同時に占有しない」という排他占有の不変条件を単独で保証します。
//!
//! ## 主要機能
//!
//! - **配置管理**: ポイントエンティティ（ロボット）とボリュームエンティティ
//!   （障害物）の登録・削除
//! - **移動管理**: 境界・占有を検証した上でのセル間移転（全か無か）
//! - **照会**: セル占有状態、座標逆引き、近傍検索
//! - **描画**: Z層ごとの記号グリッド出力（デバッグ用）
//!
//! ## 検証順序
//!
//! 座標を受け取る操作は必ず境界チェックを最初に行い、その後に占有チェックを
//! 行います。障害物の配置はAABB内の全セルの検証に通った場合のみ書き込まれ、
//! 一部でも失敗すれば全体が拒否されます（グリッドは変化しません）。

use std::fmt;

use tracing::{debug, trace};

use crate::models::common::{EntityKind, Point3, RobotState};
use crate::models::entity::Entity;
use crate::models::robot::Robot;

/// ワールド操作のエラー
///
/// いずれも呼び出し側が分岐可能な回復可能エラーであり、失敗した操作は
/// グリッドとエンティティの状態を一切変更しません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// 0以下の寸法でワールドを構築しようとした
    InvalidDimensions { width: i32, depth: i32, height: i32 },
    /// 座標がグリッド境界外
    OutOfBounds { x: i32, y: i32, z: i32 },
    /// 対象セルが別のエンティティに占有されている
    Collision { x: i32, y: i32, z: i32 },
    /// 電源OFFのエンティティへの操作
    EntityInactive(String),
    /// 種別規則により許可されない動作
    ActionNotAllowed(String),
    /// 指定IDのエンティティが未登録
    EntityNotFound(String),
    /// 同じIDのエンティティが登録済み
    DuplicateEntity(String),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::InvalidDimensions { width, depth, height } => {
                write!(
                    f,
                    "無効なワールド寸法です: {}x{}x{}（すべて正の値が必要）",
                    width, depth, height
                )
            }
            WorldError::OutOfBounds { x, y, z } => {
                write!(f, "座標 ({}, {}, {}) はワールド境界外です", x, y, z)
            }
            WorldError::Collision { x, y, z } => {
                write!(f, "セル ({}, {}, {}) は既に占有されています", x, y, z)
            }
            WorldError::EntityInactive(id) => {
                write!(f, "ロボット {} は電源OFFのため操作できません", id)
            }
            WorldError::ActionNotAllowed(msg) => {
                write!(f, "許可されていない動作です: {}", msg)
            }
            WorldError::EntityNotFound(id) => {
                write!(f, "エンティティ {} が見つかりません", id)
            }
            WorldError::DuplicateEntity(id) => {
                write!(f, "エンティティID {} は既に登録されています", id)
            }
        }
    }
}

impl std::error::Error for WorldError {}

/// 3次元占有グリッド
///
/// 寸法は構築後に変更できません。セルごとの占有タグを密な1次元配列で保持し、
/// エンティティ本体は登録順のリストで所有します。ロボットの位置フィールドを
/// 更新する唯一の経路は move_entity の成功時です。
pub struct World {
    width: i32,
    depth: i32,
    height: i32,
    grid: Vec<EntityKind>,
    entities: Vec<Entity>,
}

impl World {
    /// 指定寸法のワールドを作成
    ///
    /// # 引数
    ///
    /// * `width` - X方向のセル数
    /// * `depth` - Y方向のセル数
    /// * `height` - Z方向のセル数
    pub fn new(width: i32, depth: i32, height: i32) -> Result<Self, WorldError> {
        if width <= 0 || depth <= 0 || height <= 0 {
            return Err(WorldError::InvalidDimensions { width, depth, height });
        }
        let cell_total = (width as usize) * (depth as usize) * (height as usize);
        Ok(Self {
            width,
            depth,
            height,
            grid: vec![EntityKind::Empty; cell_total],
            entities: Vec::new(),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// 座標がグリッド境界内かどうかを判定
    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.depth && z >= 0 && z < self.height
    }

    fn cell_index(&self, x: i32, y: i32, z: i32) -> usize {
        ((z as usize) * (self.depth as usize) + (y as usize)) * (self.width as usize)
            + (x as usize)
    }

    /// セルの占有タグを取得
    pub fn cell(&self, x: i32, y: i32, z: i32) -> Result<EntityKind, WorldError> {
        if !self.in_bounds(x, y, z) {
            return Err(WorldError::OutOfBounds { x, y, z });
        }
        Ok(self.grid[self.cell_index(x, y, z)])
    }

    /// セルが占有されているかどうか
    pub fn is_occupied(&self, x: i32, y: i32, z: i32) -> Result<bool, WorldError> {
        Ok(self.cell(x, y, z)? != EntityKind::Empty)
    }

    /// エンティティを登録
    ///
    /// ロボットは現在位置の1セル、通行を妨害する障害物はAABB内の全セルを
    /// 占有します。占有するセルすべてについて境界チェック・占有チェックに
    /// 通った場合のみ書き込み、一部でも失敗すれば全体を拒否します。
    pub fn add_entity(&mut self, entity: Entity) -> Result<(), WorldError> {
        if self.entity(entity.id()).is_some() {
            return Err(WorldError::DuplicateEntity(entity.id().to_string()));
        }

        // 全セルを検証してからコミット（全か無か）
        let cells = entity.claimed_cells();
        for cell in &cells {
            if !self.in_bounds(cell.x, cell.y, cell.z) {
                return Err(WorldError::OutOfBounds {
                    x: cell.x,
                    y: cell.y,
                    z: cell.z,
                });
            }
            if self.grid[self.cell_index(cell.x, cell.y, cell.z)] != EntityKind::Empty {
                return Err(WorldError::Collision {
                    x: cell.x,
                    y: cell.y,
                    z: cell.z,
                });
            }
        }

        let kind = entity.kind();
        for cell in &cells {
            let index = self.cell_index(cell.x, cell.y, cell.z);
            self.grid[index] = kind;
        }

        debug!("エンティティ登録: {} ({}セル)", entity.id(), cells.len());
        self.entities.push(entity);
        Ok(())
    }

    /// エンティティを削除
    ///
    /// 占有していた全セルを解放してエンティティ本体を返します。境界外の
    /// セルは無視します。未登録（削除済み）のIDに対してはNoneを返し、
    /// グリッドは変化しません。
    pub fn remove_entity(&mut self, id: &str) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        let entity = self.entities.remove(index);

        for cell in entity.claimed_cells() {
            if self.in_bounds(cell.x, cell.y, cell.z) {
                let cell_index = self.cell_index(cell.x, cell.y, cell.z);
                self.grid[cell_index] = EntityKind::Empty;
            }
        }

        debug!("エンティティ削除: {}", id);
        Some(entity)
    }

    /// ポイントエンティティを指定セルへ移動
    ///
    /// ボリュームエンティティには適用できません。旧セルの解放・新セルの
    /// 書き込み・保持位置の更新は1つの遷移として完了し、いずれかの検証に
    /// 失敗した場合は位置もグリッドも変化しません。
    pub fn move_entity(&mut self, id: &str, x: i32, y: i32, z: i32) -> Result<(), WorldError> {
        let index = self
            .entities
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| WorldError::EntityNotFound(id.to_string()))?;

        let (old_position, state) = match &self.entities[index] {
            Entity::Robot(robot) => (robot.position, robot.state),
            Entity::Obstacle(_) => {
                return Err(WorldError::ActionNotAllowed(format!(
                    "障害物 {} は移動できません",
                    id
                )));
            }
        };

        if state == RobotState::Off {
            return Err(WorldError::EntityInactive(id.to_string()));
        }
        if !self.in_bounds(x, y, z) {
            return Err(WorldError::OutOfBounds { x, y, z });
        }

        let target_index = self.cell_index(x, y, z);
        let same_cell = old_position.x == x && old_position.y == y && old_position.z == z;
        if self.grid[target_index] != EntityKind::Empty && !same_cell {
            return Err(WorldError::Collision { x, y, z });
        }

        // コミット: 旧セル解放 → 新セル書き込み → 位置更新
        let old_index = self.cell_index(old_position.x, old_position.y, old_position.z);
        self.grid[old_index] = EntityKind::Empty;
        self.grid[target_index] = EntityKind::Robot;
        if let Entity::Robot(robot) = &mut self.entities[index] {
            robot.position = Point3::new(x, y, z);
        }

        trace!("移動完了: {} {} -> ({}, {}, {})", id, old_position, x, y, z);
        Ok(())
    }

    /// 指定セルに位置するポイントエンティティを取得
    ///
    /// 保持位置が正確に(x, y, z)と一致するロボットを返します。障害物は
    /// セル単位の逆引き対象とせず、AABB包含判定での走査により検索します。
    pub fn entity_at(&self, x: i32, y: i32, z: i32) -> Option<&Entity> {
        self.entities.iter().find(|e| match e {
            Entity::Robot(robot) => {
                robot.position.x == x && robot.position.y == y && robot.position.z == z
            }
            Entity::Obstacle(_) => false,
        })
    }

    /// IDでエンティティを取得
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// IDでロボットを取得
    ///
    /// 指定IDが障害物の場合はActionNotAllowed、未登録の場合は
    /// EntityNotFoundを返します。
    pub fn robot(&self, id: &str) -> Result<&Robot, WorldError> {
        match self.entity(id) {
            Some(Entity::Robot(robot)) => Ok(robot),
            Some(Entity::Obstacle(_)) => Err(WorldError::ActionNotAllowed(format!(
                "エンティティ {} はロボットではありません",
                id
            ))),
            None => Err(WorldError::EntityNotFound(id.to_string())),
        }
    }

    /// IDでロボットを可変参照として取得
    pub fn robot_mut(&mut self, id: &str) -> Result<&mut Robot, WorldError> {
        match self.entities.iter_mut().find(|e| e.id() == id) {
            Some(Entity::Robot(robot)) => Ok(robot),
            Some(Entity::Obstacle(_)) => Err(WorldError::ActionNotAllowed(format!(
                "エンティティ {} はロボットではありません",
                id
            ))),
            None => Err(WorldError::EntityNotFound(id.to_string())),
        }
    }

    /// 登録順のエンティティ一覧
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// 指定座標から半径内にあるエンティティを検索
    ///
    /// 距離は一律に3次元ユークリッド距離で、ロボットは保持位置から、
    /// 障害物はAABB表面の最近接点から計測します（半径は境界含む）。
    pub fn entities_near(&self, center: Point3, radius: f64) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|e| {
                let distance = match e {
                    Entity::Robot(robot) => robot.position.distance_3d(&center),
                    Entity::Obstacle(obstacle) => obstacle.distance_to(&center),
                };
                distance <= radius
            })
            .collect()
    }

    /// 指定Z層を記号のグリッドとして描画
    ///
    /// 各セルについて、ロボットの記号 → 障害物の記号 → 占有タグの
    /// フォールバック記号の順で解決します。
    pub fn render_layer(&self, z: i32) -> Result<String, WorldError> {
        if z < 0 || z >= self.height {
            return Err(WorldError::OutOfBounds { x: 0, y: 0, z });
        }
        let mut output = String::new();
        for y in (0..self.depth).rev() {
            for x in 0..self.width {
                output.push(self.resolve_symbol(x, y, z));
            }
            output.push('\n');
        }
        Ok(output)
    }

    /// 全Z層を描画
    pub fn render(&self) -> String {
        let mut output = String::new();
        for z in 0..self.height {
            output.push_str(&format!("=== Z={} ===\n", z));
            if let Ok(layer) = self.render_layer(z) {
                output.push_str(&layer);
            }
        }
        output
    }

    fn resolve_symbol(&self, x: i32, y: i32, z: i32) -> char {
        if let Some(entity) = self.entity_at(x, y, z) {
            return entity.symbol();
        }
        let point = Point3::new(x, y, z);
        if let Some(obstacle) = self
            .entities
            .iter()
            .filter_map(|e| e.as_obstacle())
            .find(|o| o.bounds.contains(&point))
        {
            return obstacle.obstacle_type.symbol();
        }
        self.grid[self.cell_index(x, y, z)].symbol()
    }
}
