use bevy::math::Vec2;

/// First pair (by index order) whose centres are closer than `min_distance`.
pub fn first_collision(positions: &[Vec2], min_distance: f32) -> Option<(usize, usize)> {
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            if positions[i].distance(positions[j]) < min_distance {
                return Some((i, j));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sprite_never_collides() {
        assert_eq!(first_collision(&[Vec2::ZERO], 50.0), None);
        assert_eq!(first_collision(&[], 50.0), None);
    }

    #[test]
    fn distance_must_be_strictly_less() {
        let touching = [Vec2::ZERO, Vec2::new(50.0, 0.0)];
        assert_eq!(first_collision(&touching, 50.0), None);

        let overlapping = [Vec2::ZERO, Vec2::new(30.0, 39.0)];
        assert_eq!(first_collision(&overlapping, 50.0), Some((0, 1)));
    }

    #[test]
    fn reports_the_first_pair() {
        let positions = [
            Vec2::new(-200.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(200.0, 0.0),
            Vec2::new(10.0, 10.0),
        ];
        assert_eq!(first_collision(&positions, 50.0), Some((1, 3)));
    }
}
