use std::collections::HashSet;
use std::time::Duration;

use itertools::Itertools;
use log::debug;
use rand::RngCore;

use crate::game::randomizer::pick_one;
use crate::game::rules::{Classification, GameRules, ResolutionPolicy, Scoring};
use crate::helpers::CharEnds;
use crate::model::{Difficulty, GameId, PlayerInput, SessionState};

const REPLY_DELAY: Duration = Duration::from_millis(600);
const MIN_WORD_CHARS: usize = 2;

pub const DICTIONARY: &[(char, &[&str])] = &[
    ('가', &["가방", "가수", "가을", "가족", "가게", "가구", "가슴", "가위", "가지"]),
    ('나', &["나무", "나비", "나라", "나이", "나물", "나침반"]),
    ('다', &["다리", "다람쥐", "다이아몬드", "다음"]),
    ('라', &["라면", "라디오", "라일락"]),
    ('마', &["마음", "마을", "마차", "마루", "마늘", "마법"]),
    ('바', &["바다", "바람", "바나나", "바위", "바지", "바구니"]),
    ('사', &["사과", "사람", "사자", "사슴", "사탕", "사진", "사다리"]),
    ('아', &["아기", "아침", "아버지", "아이", "아파트"]),
    ('자', &["자동차", "자전거", "자리", "자두", "자석"]),
    ('차', &["차가운", "차례"]),
    ('카', &["카메라", "카드"]),
    ('타', &["타조", "타이어"]),
    ('파', &["파도", "파란", "파리"]),
    ('하', &["하늘", "하마", "하루", "하나"]),
    ('고', &["고양이", "고래", "고구마", "고리", "고무"]),
    ('노', &["노래", "노을", "노트"]),
    ('도', &["도서관", "도시", "도마", "도토리"]),
    ('로', &["로봇", "로켓"]),
    ('모', &["모자", "모래", "모기", "모형"]),
    ('보', &["보물", "보석", "보리"]),
    ('소', &["소나무", "소리", "소금", "소방차"]),
    ('오', &["오리", "오렌지", "오이", "오징어"]),
    ('조', &["조개", "조카"]),
    ('토', &["토끼", "토마토"]),
    ('포', &["포도", "포크"]),
    ('호', &["호랑이", "호수", "호두"]),
    ('구', &["구름", "구슬", "구두"]),
    ('두', &["두부", "두꺼비"]),
    ('무', &["무지개", "무릎"]),
    ('부', &["부엌", "부채", "부모"]),
    ('수', &["수박", "수건", "수영"]),
    ('우', &["우산", "우유", "우체국", "우주"]),
    ('주', &["주사위", "주머니", "주전자"]),
    ('추', &["추석", "추위"]),
    ('후', &["후추", "후회"]),
    ('기', &["기차", "기린", "기타"]),
    ('리', &["리본"]),
    ('미', &["미소", "미역"]),
    ('비', &["비행기", "비누", "비둘기"]),
    ('시', &["시계", "시장", "시소"]),
    ('이', &["이불", "이슬"]),
    ('피', &["피아노", "피자"]),
    ('개', &["개나리", "개미"]),
    ('새', &["새우"]),
    ('배', &["배추", "배꼽"]),
    ('해', &["해바라기", "해적"]),
    ('래', &["래프팅"]),
    ('대', &["대나무", "대문"]),
    ('매', &["매미", "매듭"]),
    ('세', &["세탁기", "세계"]),
    ('게', &["게임"]),
    ('네', &["네모"]),
    ('레', &["레몬", "레이저"]),
    ('베', &["베개"]),
    ('물', &["물고기", "물감"]),
    ('돌', &["돌고래"]),
    ('불', &["불꽃"]),
    ('눈', &["눈사람"]),
    ('산', &["산타", "산호"]),
    ('달', &["달팽이", "달력"]),
    ('말', &["말벌"]),
    ('발', &["발자국"]),
    ('장', &["장갑", "장미"]),
    ('강', &["강아지"]),
    ('공', &["공룡", "공원"]),
    ('곰', &["곰팡이"]),
    ('꽃', &["꽃게"]),
    ('별', &["별자리"]),
    ('선', &["선물", "선인장"]),
    ('연', &["연필", "연꽃"]),
    ('전', &["전화", "전봇대"]),
    ('원', &["원숭이"]),
];

pub fn all_words() -> impl Iterator<Item = &'static str> {
    DICTIONARY.iter().flat_map(|(_, words)| words.iter().copied())
}

pub fn words_starting_with(first: char) -> &'static [&'static str] {
    DICTIONARY
        .iter()
        .find(|(initial, _)| *initial == first)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordChainProfile {
    pub hint_enabled: bool,
    pub max_turns: u32,
}

impl WordChainProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => WordChainProfile {
                hint_enabled: true,
                max_turns: 5,
            },
            Difficulty::Normal => WordChainProfile {
                hint_enabled: true,
                max_turns: 8,
            },
            Difficulty::Hard => WordChainProfile {
                hint_enabled: false,
                max_turns: 12,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub opponent_word: &'static str,
    pub required: char,
}

/// Word chaining against the computer. One round is one player turn; the opponent's reply is
/// the next round's content.
#[derive(Debug)]
pub struct WordChain {
    difficulty: Difficulty,
    profile: WordChainProfile,
    used: HashSet<String>,
    history: Vec<String>,
    last_player_char: Option<char>,
}

impl WordChain {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            profile: WordChainProfile::for_difficulty(difficulty),
            used: HashSet::new(),
            history: Vec::new(),
            last_player_char: None,
        }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn is_used(&self, word: &str) -> bool {
        self.used.contains(word)
    }

    fn opponent_word(&self, rng: &mut dyn RngCore) -> Option<&'static str> {
        let candidates = match self.last_player_char {
            None => all_words().filter(|word| !self.is_used(word)).collect_vec(),
            Some(last) => words_starting_with(last)
                .iter()
                .copied()
                .filter(|word| !self.is_used(word))
                .collect_vec(),
        };
        pick_one(rng, &candidates).ok().copied()
    }

    fn hint(&self, turn: &Turn) -> String {
        if self.profile.hint_enabled {
            format!("Type a word that starts with \"{}\"", turn.required)
        } else {
            format!("Next character: \"{}\"", turn.required)
        }
    }
}

impl GameRules for WordChain {
    type Round = Turn;
    type Input = String;

    fn game_id(&self) -> GameId {
        GameId::WordChain
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn total_rounds(&self) -> Option<u32> {
        Some(self.profile.max_turns)
    }

    fn scoring(&self) -> Scoring {
        Scoring::Accuracy
    }

    fn resolution_policy(&self) -> ResolutionPolicy {
        ResolutionPolicy::RetrySameRound
    }

    fn success_delay(&self, finishing: bool) -> Duration {
        if finishing {
            Duration::ZERO
        } else {
            REPLY_DELAY
        }
    }

    fn error_delay(&self) -> Duration {
        Duration::ZERO
    }

    fn start_session(&mut self, _rng: &mut dyn RngCore) {
        self.used.clear();
        self.history.clear();
        self.last_player_char = None;
    }

    fn generate_round(&mut self, rng: &mut dyn RngCore) -> Option<Turn> {
        let word = self.opponent_word(rng)?;
        let required = word.last_char()?;
        debug!(target: "game_state", "Opponent plays {word}");
        self.used.insert(word.to_string());
        self.history.push(word.to_string());
        Some(Turn {
            opponent_word: word,
            required,
        })
    }

    fn parse_input(&self, input: PlayerInput) -> Option<String> {
        match input {
            PlayerInput::Word(word) => Some(word),
            PlayerInput::Digit(digit) => Some(digit.to_string()),
            _ => None,
        }
    }

    fn classify(&mut self, turn: &mut Turn, input: String) -> Classification {
        let word = input.trim();
        if word.chars().count() < MIN_WORD_CHARS {
            return Classification::Rejected(format!(
                "Use at least {MIN_WORD_CHARS} characters"
            ));
        }
        if word.first_char() != Some(turn.required) {
            return Classification::Rejected(format!(
                "The word has to start with \"{}\"",
                turn.required
            ));
        }
        if self.is_used(word) {
            return Classification::Rejected("That word was already used".to_string());
        }
        self.used.insert(word.to_string());
        self.history.push(word.to_string());
        self.last_player_char = word.last_char();
        Classification::Correct
    }

    /// A completed chain scores by turns played; an opponent with no reply concedes 100.
    fn accuracy_score(&self, session: &SessionState, forfeited: bool) -> u32 {
        if forfeited {
            return 100;
        }
        let turns = session.rounds_resolved as f64;
        ((turns / self.profile.max_turns as f64) * 100.0).round() as u32
    }

    fn describe_round(&self, turn: &Turn) -> String {
        format!("Computer: {}\n{}", turn.opponent_word, self.hint(turn))
    }

    fn success_message(&self, _rng: &mut dyn RngCore) -> String {
        "Good one!".to_string()
    }

    fn result_details(&self, session: &SessionState) -> Vec<String> {
        vec![
            format!("Turns: {}/{}", session.rounds_resolved, self.profile.max_turns),
            format!("Words used: {}", self.used.len()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn started(difficulty: Difficulty) -> (WordChain, StdRng) {
        let mut rng = StdRng::seed_from_u64(12);
        let mut game = WordChain::new(difficulty);
        game.start_session(&mut rng);
        (game, rng)
    }

    #[test]
    fn test_dictionary_groups_match_their_initial() {
        for (initial, words) in DICTIONARY {
            assert!(!words.is_empty());
            assert!(words.iter().all(|word| word.first_char() == Some(*initial)));
        }
        assert_eq!(all_words().count(), all_words().unique().count());
    }

    #[test]
    fn test_opponent_opens_with_a_dictionary_word() {
        let (mut game, mut rng) = started(Difficulty::Easy);
        let turn = game.generate_round(&mut rng).unwrap();
        assert!(all_words().contains(&turn.opponent_word));
        assert_eq!(Some(turn.required), turn.opponent_word.last_char());
        assert!(game.is_used(turn.opponent_word));
    }

    #[test]
    fn test_player_word_validation() {
        let (mut game, _) = started(Difficulty::Easy);
        let mut turn = Turn {
            opponent_word: "나무",
            required: '무',
        };
        game.used.insert("나무".to_string());

        assert!(matches!(
            game.classify(&mut turn, "무".to_string()),
            Classification::Rejected(_)
        ));
        assert!(matches!(
            game.classify(&mut turn, "사과".to_string()),
            Classification::Rejected(_)
        ));
        assert_eq!(game.classify(&mut turn, "  무지개 ".to_string()), Classification::Correct);
        assert!(matches!(
            game.classify(&mut turn, "무지개".to_string()),
            Classification::Rejected(_)
        ));
        // no dictionary membership check on player words
        assert_eq!(game.classify(&mut turn, "무무무".to_string()), Classification::Correct);
    }

    #[test]
    fn test_opponent_answers_from_last_character_or_concedes() {
        let (mut game, mut rng) = started(Difficulty::Normal);
        let mut turn = Turn {
            opponent_word: "가방",
            required: '방',
        };
        assert_eq!(game.classify(&mut turn, "방울토마토".to_string()), Classification::Correct);
        let reply = game.generate_round(&mut rng);
        // nothing in the dictionary starts with 토 other than 토끼 and 토마토
        let reply = reply.unwrap();
        assert!(["토끼", "토마토"].contains(&reply.opponent_word));

        let mut turn = Turn {
            opponent_word: "가방",
            required: '방',
        };
        assert_eq!(game.classify(&mut turn, "방귀뀌".to_string()), Classification::Correct);
        assert_eq!(game.generate_round(&mut rng), None);
    }

    #[test]
    fn test_score_by_turns_or_forfeit() {
        let game = WordChain::new(Difficulty::Normal);
        let mut session = SessionState::new(Some(8), Duration::ZERO);
        session.rounds_resolved = 3;
        assert_eq!(game.accuracy_score(&session, false), 38);
        assert_eq!(game.accuracy_score(&session, true), 100);
        session.rounds_resolved = 8;
        assert_eq!(game.accuracy_score(&session, false), 100);
    }

    #[test]
    fn test_hint_visibility_by_tier() {
        let turn = Turn {
            opponent_word: "바다",
            required: '다',
        };
        let easy = WordChain::new(Difficulty::Easy).describe_round(&turn);
        let hard = WordChain::new(Difficulty::Hard).describe_round(&turn);
        assert!(easy.contains("starts with \"다\""));
        assert!(hard.contains("Next character: \"다\""));
    }
}
