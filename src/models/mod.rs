// 基本的なデータ型と幾何プリミティブ
pub mod common;

// エンティティの基本インターフェース（trait）定義
pub mod traits;

// 各エンティティモデルの実装
pub mod entity;
pub mod movement;
pub mod obstacle;
pub mod robot;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use entity::Entity;
pub use movement::{AerialMovement, GroundMovement, Movement};
pub use obstacle::{Obstacle, ObstacleType};
pub use robot::Robot;
