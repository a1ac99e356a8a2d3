//! Per-entity animation clock.
//!
//! Entities only carry a tag and a frame counter; the renderer decides
//! what a given frame looks like.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimTag {
    Idle,
    Run,
    Jump,
    Attack,
    Skill,
    Hurt,
    Move,
    Death,
}

/// Frame count, frame duration and loop behaviour of one tag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clip {
    pub frames: u32,
    pub frame_ms: f32,
    pub looping: bool,
}

impl Clip {
    pub const fn looped(frames: u32, frame_ms: f32) -> Self {
        Self { frames, frame_ms, looping: true }
    }

    pub const fn once(frames: u32, frame_ms: f32) -> Self {
        Self { frames, frame_ms, looping: false }
    }
}

pub const PLAYER_CLIPS: &[(AnimTag, Clip)] = &[
    (AnimTag::Idle, Clip::looped(4, 100.0)),
    (AnimTag::Run, Clip::looped(6, 150.0)),
    (AnimTag::Jump, Clip::once(3, 100.0)),
    (AnimTag::Attack, Clip::once(4, 200.0)),
    (AnimTag::Skill, Clip::once(5, 150.0)),
    (AnimTag::Hurt, Clip::once(2, 100.0)),
];

pub const ENEMY_CLIPS: &[(AnimTag, Clip)] = &[
    (AnimTag::Idle, Clip::looped(4, 80.0)),
    (AnimTag::Move, Clip::looped(4, 120.0)),
    (AnimTag::Attack, Clip::once(3, 150.0)),
    (AnimTag::Hurt, Clip::once(2, 100.0)),
    (AnimTag::Death, Clip::once(4, 100.0)),
];

pub const BOSS_CLIPS: &[(AnimTag, Clip)] = &[
    (AnimTag::Idle, Clip::looped(6, 80.0)),
    (AnimTag::Move, Clip::looped(8, 120.0)),
    (AnimTag::Attack, Clip::once(6, 150.0)),
    (AnimTag::Skill, Clip::once(8, 100.0)),
    (AnimTag::Death, Clip::once(10, 100.0)),
];

#[derive(Clone, Debug, PartialEq)]
pub struct Animator {
    clips: &'static [(AnimTag, Clip)],
    current: AnimTag,
    frame: u32,
    elapsed: f32,
}

impl Animator {
    pub fn new(clips: &'static [(AnimTag, Clip)]) -> Self {
        Self {
            clips,
            current: AnimTag::Idle,
            frame: 0,
            elapsed: 0.0,
        }
    }

    pub fn current(&self) -> AnimTag {
        self.current
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    fn clip(&self) -> Option<Clip> {
        self.clips
            .iter()
            .find(|(tag, _)| *tag == self.current)
            .map(|(_, clip)| *clip)
    }

    /// Switch to `tag`.  Re-playing the current tag keeps its progress.
    pub fn play(&mut self, tag: AnimTag) {
        if self.current != tag {
            self.current = tag;
            self.frame = 0;
            self.elapsed = 0.0;
        }
    }

    /// A one-shot clip that has reached its last frame.
    pub fn is_finished(&self) -> bool {
        match self.clip() {
            Some(clip) => !clip.looping && self.frame + 1 >= clip.frames,
            None => true,
        }
    }

    /// A one-shot clip still playing; locomotion must not cut it short.
    pub fn is_locked(&self) -> bool {
        self.clip().is_some_and(|clip| !clip.looping) && !self.is_finished()
    }

    /// Advance by `dt_ms`.  Tags without a clip stay frozen.
    pub fn advance(&mut self, dt_ms: f32) {
        let Some(clip) = self.clip() else {
            return;
        };
        if clip.frames == 0 || clip.frame_ms <= 0.0 {
            return;
        }
        self.elapsed += dt_ms;
        while self.elapsed >= clip.frame_ms {
            self.elapsed -= clip.frame_ms;
            if self.frame + 1 < clip.frames {
                self.frame += 1;
            } else if clip.looping {
                self.frame = 0;
            } else {
                self.elapsed = 0.0;
                break;
            }
        }
    }
}
