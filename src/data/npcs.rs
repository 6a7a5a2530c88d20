use bevy::prelude::*;

use crate::dialogue::*;
use crate::shared::*;

use super::ContentError;

/// Populate the NpcRegistry with the eleven friends around the shrine.
///
/// Each has the same greeting and a birthday message. Eight recorded a
/// voice message, captioned with timed subtitles; Chris, Scarfy and Mel
/// wrote theirs, so it is typed out line by line instead.
///
///   Rintsuki:  torii gate          Anipha: picnic blanket, back left
///   Bumblebee: west lawn           Thighs: picnic blanket, back right
///   Macs:      east lawn           Santru: bridge, west end
///   Levenski:  picnic blanket      Chris:  bridge, east end
///   Howl:      picnic blanket      Scarfy: shrine steps
///                                  Mel:    riverbank
pub fn populate_npcs(registry: &mut NpcRegistry) -> Result<(), ContentError> {
    registry.npcs.clear();

    // ── Rintsuki ────────────────────────────────────────────────────────────
    registry.insert(profile(
        NpcId::Rintsuki,
        Vec2::new(1070.0, 820.0),
        voice(
            NpcId::Rintsuki,
            "rintsuki",
            vec![
                SubtitleCue::new(0.0, "Happy Birthday, Void!", "ハッピーバースデー、ヴォイド！"),
                SubtitleCue::new(2.7, "Happy Birthday (in japanese :D)", "お誕生日おめでとう。"),
                SubtitleCue::new(4.2, "Let's continue to get along! <3", "これからも、仲良くしようね。"),
                SubtitleCue::new(
                    7.4,
                    "Whether it's gaming or chatting or anything really, let's hangout with everyone again.",
                    "また皆で、ゲームとか通話 とか何でもいいけど、 それで遊ぼうね",
                ),
                SubtitleCue::new(
                    11.2,
                    "Hope you have a good year! Congrats again on turning 19 years old!",
                    "いい一年にしてね 19才改めておめでとう！！",
                ),
            ],
        )?,
    ));

    // ── Bumblebee ───────────────────────────────────────────────────────────
    registry.insert(profile(
        NpcId::Bumblebee,
        Vec2::new(300.0, 880.0),
        voice(
            NpcId::Bumblebee,
            "bumblebee",
            vec![
                SubtitleCue::new(0.0, "happy Birthday, void!", "ハッピーバースデー、ヴォイド！"),
                SubtitleCue::new(
                    3.0,
                    "congrats on hitting 19 years old. so awesome.",
                    "19歳のお誕生日おめでとう。本当にすごいよ。",
                ),
                SubtitleCue::new(
                    7.2,
                    "when you finish celebrating, we should play more freaking overwatch and hit diamond.",
                    "お祝い終わったら、もっとオーバーウォッチやろうぜ。ダイヤモンドまで行こうぜ。",
                ),
                SubtitleCue::new(12.5, "happy birthday femboyyyyy", "お誕生日おめでとう、femboyyyyy"),
            ],
        )?,
    ));

    // ── Macs ────────────────────────────────────────────────────────────────
    registry.insert(profile(
        NpcId::Macs,
        Vec2::new(1790.0, 870.0),
        voice(
            NpcId::Macs,
            "macs",
            vec![
                SubtitleCue::new(0.0, "Happy Birthday, Void!", "ハッピーバースデー、ヴォイド！"),
                SubtitleCue::new(
                    3.0,
                    "I hope your awesome weirdness shines all year long",
                    "あなたの素晴らしい奇妙さが一年中輝きますように",
                ),
                SubtitleCue::new(
                    6.5,
                    "and may your \u{201c}perfectly imperfect\u{201d} English keep making us laugh and like you even more!",
                    "そしてあなたの「完璧な不完全さ」が、これからも私たちを笑わせ、あなたをもっと好きにさせてくれますように！",
                ),
            ],
        )?,
    ));

    // ── Levenski ────────────────────────────────────────────────────────────
    registry.insert(profile(
        NpcId::Levenski,
        Vec2::new(1380.0, 700.0),
        voice(
            NpcId::Levenski,
            "levenski",
            vec![
                SubtitleCue::new(
                    0.0,
                    "hey Bro, I just wanted to say happy birthday and also did you know today was the day you were born?",
                    "おい、bro、誕生日おめでとうって言いたかっただけなんだ。それと、今日がお前の誕生日だって知ってたか？",
                ),
                SubtitleCue::new(6.0, "fuck I didn't know til you told me", "fuck、お前が言うまで知らなかったぜ"),
                SubtitleCue::new(
                    9.0,
                    "but hey, on a real note, I wanted to tell you that I hope you enjoy the day cause",
                    "でもねえ、本音を言うと、今日は楽しんでほしいって伝えたくてさ。だって",
                ),
                SubtitleCue::new(
                    14.3,
                    "it's your day and that I hope that you know a bright future comes",
                    "今日はあなたの日だ。そして、輝かしい未来が訪れることを願っている",
                ),
                SubtitleCue::new(
                    20.0,
                    "and I wanted to say that it's been real getting to know you and hang out whenever bro",
                    "そして言いたかったのは、君と知り合って一緒に過ごせたのは本当に良かったってことだぜ、bro",
                ),
                SubtitleCue::new(
                    27.0,
                    "if you ever need anything just hmu and i'll be here for you bro",
                    "何か必要なことがあったらいつでも連絡してくれ、いつでも君の味方だぜbro",
                ),
                SubtitleCue::new(30.3, "anyways, happy birthday", "とにかく、誕生日おめでとう"),
            ],
        )?,
    ));

    // ── Howl ────────────────────────────────────────────────────────────────
    registry.insert(profile(
        NpcId::Howl,
        Vec2::new(1500.0, 700.0),
        voice(
            NpcId::Howl,
            "howl",
            vec![
                SubtitleCue::new(0.0, "ah ah ah. is this thing on?", "あーあーあーこれ、オンになってる？"),
                SubtitleCue::new(
                    10.0,
                    "alright sick. anyway hi, how are you void?",
                    "よし、イケてる??????? LMAO とにかく、やあ、元気？ボイド？",
                ),
                SubtitleCue::new(
                    20.0,
                    "I heard your birthday is coming up, and I just wanted to say first and foremost Happy birthday.",
                    "誕生日が近いって聞いたよ。まずは何よりも。お誕生日おめでとうって言いたくて",
                ),
                SubtitleCue::new(
                    25.0,
                    "and since, you know we've been friends for a minute. I just gotta say something.",
                    "それに、ほら。僕たち、結構長い間友達だし。言わなきゃいけないことがあるんだ",
                ),
                SubtitleCue::new(
                    30.0,
                    "it's been a real honor to be your friend to play a few games with you and it feels nice to just feel accepted in your server",
                    "君の友達でいられて本当に光栄だよ。君といくつかのゲームをプレイできて。君のサーバーで受け入れられてるって感じるのが、すごく心地いいんだ",
                ),
                SubtitleCue::new(
                    35.0,
                    "I don't know something sweet and embarrassing should be here. oh right um",
                    "何か甘くて恥ずかしい言葉を入れるべきなんだけどな。ああそうだ、えっと",
                ),
                SubtitleCue::new(
                    40.0,
                    "you kind of are like a little brother to me, so I wanna like take care of you and like",
                    "君って僕にとって弟みたいな存在なんだ、だから面倒見てあげたいし。",
                ),
                SubtitleCue::new(
                    45.0,
                    "help you nurture and grow as a person, but I'm not gonna stop you from doing whatever you wanna do",
                    "人間として育つ手助けもしたい、でも君のやりたいことや",
                ),
                SubtitleCue::new(
                    50.0,
                    "and whatever choices you wanna make, you know you fuck around and find out, right?",
                    "選ぶ道は絶対に止めたりしない。知ってるだろ？ ふざけてると痛い目見るって",
                ),
                SubtitleCue::new(
                    55.0,
                    "that's how life is so, whatever you do, like, do it at 100% full force",
                    "人生ってそういうものだから、何をするにしても、100%の力で全力でやって",
                ),
                SubtitleCue::new(
                    60.0,
                    "and keep that same energy until the next year, and then the next year",
                    "そのエネルギーを来年まで、その次の年まで持ち続けて",
                ),
                SubtitleCue::new(
                    65.0,
                    "and just know that I'll be rooting for you. I'll be right behind you every step of the way",
                    "ただ覚えておいて、僕は君を応援してるって。君の歩む道の、ずっと後ろで支えてるから",
                ),
                SubtitleCue::new(
                    70.0,
                    "that sounds creepy like I'm like stalking you it's not that, it's not weird I'm not trying to catch a case",
                    "ちょっと気持ち悪いよね、まるでストーカーみたいだなんて思わないで、そんなことじゃないんだ、変じゃないよ",
                ),
                SubtitleCue::new(
                    75.0,
                    "anyway um happy birthday! yeah! あああああ",
                    "とにかく、えっと、誕生日おめでとう！ やった！あああああ",
                ),
            ],
        )?,
    ));

    // ── Anipha ──────────────────────────────────────────────────────────────
    registry.insert(profile(
        NpcId::Anipha,
        Vec2::new(1360.0, 540.0),
        voice(
            NpcId::Anipha,
            "anipha",
            vec![
                SubtitleCue::new(0.0, "*anipha noises*", "*aniphaの音*"),
                SubtitleCue::new(
                    15.0,
                    "Happy Birthday Void. お誕生日おめでとう bro",
                    "お誕生日おめでとう。*2 bro",
                ),
            ],
        )?,
    ));

    // ── Thighs & Santru ─────────────────────────────────────────────────────
    // Recorded together, so both play the same captions over their own clip.
    for (npc, clip, anchor) in [
        (NpcId::Thighs, "thighs", Vec2::new(1430.0, 540.0)),
        (NpcId::Santru, "santru", Vec2::new(1630.0, 240.0)),
    ] {
        registry.insert(profile(npc, anchor, voice(npc, clip, duo_cues())?));
    }

    // ── Chris ───────────────────────────────────────────────────────────────
    registry.insert(profile(
        NpcId::Chris,
        Vec2::new(1780.0, 240.0),
        RecordedMessage::Text(vec![
            BilingualText::new(
                "誕生日おめでとう, Dylan. I'm proud of you to reach the point of where you are now.",
                "誕生日おめでとう、ディラン。今の君に誇りを感じているよ。",
            ),
            BilingualText::new(
                "Even if things have been hard, I'm glad you've kept going.",
                "たとえ辛いことがあっても、あなたが諦めずに続けてくれて嬉しい。",
            ),
            BilingualText::new(
                "Thank you for being there for me ever since I wanted to do this crazy ass dream to do this Japanese shit.",
                "このクレイジーな夢、日本語の道に進みたいと思った時からずっと支えてくれてありがとう。",
            ),
            BilingualText::new(
                "You've been a big influence on me, and everyone around you.",
                "あなたは私やあなたの周りの皆に大きな影響を与えてきた。",
            ),
            BilingualText::new(
                "Your potential is limitless; happy birthday, brother.",
                "君の可能性は無限大だ。お誕生日おめでとう、bro",
            ),
        ]),
    ));

    // ── Scarfy ──────────────────────────────────────────────────────────────
    registry.insert(profile(
        NpcId::Scarfy,
        Vec2::new(993.0, 440.0),
        RecordedMessage::Text(vec![BilingualText::new(
            "Happy Birthday Void!!! We all love you. Good luck in Oregon. We\u{2019}re always here for you.",
            "ヴォイド、お誕生日おめでとう！！！みんな君が大好きだよ。オレゴンでの幸運を祈ってる。いつでも君の味方だよ。",
        )]),
    ));

    // ── Mel ─────────────────────────────────────────────────────────────────
    registry.insert(profile(
        NpcId::Mel,
        Vec2::new(1290.0, 210.0),
        RecordedMessage::Text(vec![
            BilingualText::new(
                "Hi void youre at my age now congrats ur still a kid",
                "やあボイド、お前も俺の年齢になったな、おめでとう、まだ子供だぜ",
            ),
            BilingualText::new(
                "youre still 17 have a good day happy birthday \u{1f389}\u{1f389}\u{1f389}",
                "まだ17歳だね良い一日をお誕生日おめでとう \u{1f389}\u{1f389}\u{1f389}",
            ),
        ]),
    ));

    Ok(())
}

fn profile(id: NpcId, anchor: Vec2, message: RecordedMessage) -> NpcProfile {
    let name = format!("{:?}", id);
    NpcProfile {
        id,
        avatar: Some(format!("avatars/{}.png", name.to_lowercase())),
        name,
        anchor,
        greeting: BilingualText::new("Hey, Void! Long time no see.", "やあ、ヴォイド！久しぶりだね。"),
        message,
    }
}

fn voice(npc: NpcId, clip: &str, cues: Vec<SubtitleCue>) -> Result<RecordedMessage, ContentError> {
    SubtitleTrack::new(VoiceClip::new(format!("voices/{clip}.ogg")), cues)
        .map(RecordedMessage::Voice)
        .map_err(|source| ContentError::Script { npc, source })
}

fn duo_cues() -> Vec<SubtitleCue> {
    vec![
        SubtitleCue::new(0.0, "お誕生日 congratulations bro", "お誕生日おめでとう bro"),
        SubtitleCue::new(
            3.7,
            "can't believe you're mười chín (19 in vietnamese) years old. holy fuck now you're unc 2",
            "信じられないよ、君が19歳(ベトナム語で）だなんて。マジかよ、もうunc 2かよ",
        ),
        SubtitleCue::new(
            8.4,
            "but seriously though, happy birthday dude",
            "でもマジで、誕生日おめでとうよ、dude",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_npc_has_a_profile() {
        let mut registry = NpcRegistry::default();
        populate_npcs(&mut registry).expect("content builds");
        for npc in NpcId::ALL {
            assert!(registry.get(npc).is_some(), "{npc:?} missing");
        }
    }

    #[test]
    fn test_written_messages_are_text_only() {
        let mut registry = NpcRegistry::default();
        populate_npcs(&mut registry).expect("content builds");
        for npc in [NpcId::Chris, NpcId::Scarfy, NpcId::Mel] {
            let profile = registry.get(npc).expect("present");
            assert!(matches!(profile.message, RecordedMessage::Text(_)));
        }
        let rintsuki = registry.get(NpcId::Rintsuki).expect("present");
        let RecordedMessage::Voice(track) = &rintsuki.message else {
            panic!("Rintsuki recorded a voice message");
        };
        assert_eq!(track.clip().path(), "voices/rintsuki.ogg");
        assert_eq!(track.cues().len(), 5);
    }
}
