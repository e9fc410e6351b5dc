use crate::models::common::{EntityKind, Point3};
use crate::world::{World, WorldError};

/// ワールドのセルを占有しうるエンティティの基本インターフェース
pub trait IOccupant {
    /// エンティティの一意識別子
    fn entity_id(&self) -> &str;

    /// 占有種別タグ
    fn kind(&self) -> EntityKind;

    /// 表示記号（1文字）
    fn symbol(&self) -> char;

    /// このエンティティが占有を主張するセル座標の一覧
    ///
    /// ロボットは現在位置の1セル、通行を妨害する障害物はAABB内の全セル、
    /// 通行可能な障害物は空のリストを返します。
    fn claimed_cells(&self) -> Vec<Point3>;
}

/// 種別ごとの移動検証インターフェース
///
/// 要求された変位(dx, dy, dz)の種別固有の合法性チェックのみを行い、
/// 実際のセル移転は必ず World::move_entity に委譲します。検証器自身は
/// 一切の状態を変更しないため、占有の整合性はワールドが単独で保証します。
pub trait IMovement {
    /// 移動要求を検証し、合法ならワールドへ移動を委譲する
    fn validate(
        &self,
        world: &mut World,
        robot_id: &str,
        dx: i32,
        dy: i32,
        dz: i32,
    ) -> Result<(), WorldError>;
}
